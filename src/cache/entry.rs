//! Cache Entry Module
//!
//! Defines the record stored for every cached item.

use chrono::{DateTime, TimeDelta, Utc};

// == Cache Entry ==
/// Represents a single cache entry: its key, value and absolute expiry.
///
/// The key is kept alongside the value so that evicting from the back of the
/// recency list can also drop the matching index slot.
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    /// The lookup key
    pub key: K,
    /// The stored value
    pub value: V,
    /// Absolute expiration timestamp, None = never expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    /// Creates a new cache entry.
    pub fn new(key: K, value: V, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            key,
            value,
            expires_at,
        }
    }

    // == Is Fresh ==
    /// Checks whether the entry is still live at `now`.
    ///
    /// Boundary condition: an entry is fresh only while its expiry is strictly
    /// after `now`. An expiry equal to `now` already counts as expired.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => expires > now,
            None => true,
        }
    }

    /// Checks whether the entry is still live right now.
    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }

    // == Time To Live ==
    /// Returns the remaining lifetime at `now`, or None if the entry never expires.
    ///
    /// # Returns
    /// - `Some(TimeDelta::zero())` if the entry has expired
    /// - `Some(remaining)` if the entry has an expiry in the future
    /// - `None` if the entry never expires
    pub fn ttl_remaining_at(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.expires_at
            .map(|expires| (expires - now).max(TimeDelta::zero()))
    }
}
