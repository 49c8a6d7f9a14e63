//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Misses, expirations and removals of absent keys are ordinary results and
/// never surface here. Only construction and configuration can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity must be a positive integer
    #[error("cache: must provide a positive size (got {0})")]
    InvalidCapacity(usize),

    /// Configuration value could not be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
