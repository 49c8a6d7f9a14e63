//! Cache Module
//!
//! Provides an in-process cache with LRU eviction and lazy TTL expiration,
//! plus a locked wrapper for multi-threaded callers.

mod entry;
mod locked;
mod lru;
mod policy;
mod store;


use chrono::{DateTime, Utc};

// Re-export public types
pub use entry::CacheEntry;
pub use locked::LockedCache;
pub use lru::LruList;
pub use policy::ExpiryPolicy;
pub use store::{LruTtlCache, INVALID_CAPACITY_MSG};

// == Cache Contract ==
/// Operations shared by [`LruTtlCache`] and [`LockedCache`].
///
/// A miss is `None`, whether the key never existed or had expired.
pub trait Cache<K, V> {
    /// Inserts or replaces `key`, expiring it according to the cache policy.
    fn add(&mut self, key: K, value: V);

    /// Inserts or replaces `key` with an explicit expiry.
    fn add_with_expiry(&mut self, key: K, value: V, expires_at: DateTime<Utc>);

    /// Returns a copy of the live value for `key`.
    fn get(&mut self, key: &K) -> Option<V>;

    /// Removes `key` if present.
    fn remove(&mut self, key: &K);

    /// Number of stored entries, including expired ones nobody has looked up yet.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discards every entry.
    fn purge(&mut self);
}
