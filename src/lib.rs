//! LRU TTL Cache - A bounded in-process key/value cache
//!
//! Combines least-recently-used eviction with lazily checked per-entry
//! expiration, with an optional locked wrapper for multi-threaded callers.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{Cache, ExpiryPolicy, LockedCache, LruTtlCache};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
