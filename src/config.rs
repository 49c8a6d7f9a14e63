//! Configuration Module
//!
//! Handles loading cache and demo workload settings from environment variables.

use std::env;
use std::hash::Hash;
use std::str::FromStr;

use chrono::TimeDelta;
use serde::Serialize;

use crate::cache::LockedCache;
use crate::error::{CacheError, Result};

/// Cache and demo workload parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Lifetime in seconds given to each write; negative values expire immediately
    pub ttl_secs: i64,
    /// Whether a successful get restarts the entry lifetime
    pub refresh_on_access: bool,
    /// Number of worker threads in the demo workload
    pub workers: usize,
    /// Operations issued by each demo worker
    pub ops_per_worker: usize,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `CACHE_TTL_SECS` - Entry lifetime in seconds (default: 300)
    /// - `CACHE_REFRESH_ON_ACCESS` - Sliding expiration (default: false)
    /// - `DEMO_WORKERS` - Demo worker threads (default: 4)
    /// - `DEMO_OPS_PER_WORKER` - Demo operations per worker (default: 10000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env_or("CACHE_CAPACITY", defaults.capacity),
            ttl_secs: env_or("CACHE_TTL_SECS", defaults.ttl_secs),
            refresh_on_access: env_or("CACHE_REFRESH_ON_ACCESS", defaults.refresh_on_access),
            workers: env_or("DEMO_WORKERS", defaults.workers),
            ops_per_worker: env_or("DEMO_OPS_PER_WORKER", defaults.ops_per_worker),
        }
    }

    /// Entry lifetime as a signed duration.
    pub fn ttl(&self) -> Result<TimeDelta> {
        TimeDelta::try_seconds(self.ttl_secs).ok_or_else(|| {
            CacheError::InvalidConfig(format!("TTL of {} seconds is out of range", self.ttl_secs))
        })
    }

    /// Checks the values a cache cannot be built from.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "capacity must be a positive integer".to_string(),
            ));
        }
        self.ttl().map(|_| ())
    }

    /// Builds a thread-safe cache with a fixed TTL policy.
    pub fn build_locked<K, V>(&self) -> Result<LockedCache<K, V>>
    where
        K: Hash + Eq + Clone,
        V: Clone,
    {
        self.validate()?;
        LockedCache::try_with_ttl(self.capacity, self.ttl()?, self.refresh_on_access)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            ttl_secs: 300,
            refresh_on_access: false,
            workers: 4,
            ops_per_worker: 10_000,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
