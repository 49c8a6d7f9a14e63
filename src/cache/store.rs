//! Cache Store Module
//!
//! Main cache engine combining a key index with an arena-backed recency list
//! and lazy TTL expiration. Not safe for concurrent use; wrap it in a
//! [`LockedCache`](crate::cache::LockedCache) to share it between threads.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, trace};

use crate::cache::{Cache, CacheEntry, ExpiryPolicy, LruList};
use crate::error::{CacheError, Result};

/// Panic message used by the infallible constructors.
pub const INVALID_CAPACITY_MSG: &str = "cache: must provide a positive size";

// == LRU TTL Cache ==
/// Bounded cache with LRU eviction and lazily checked expiry.
///
/// The index maps each key to its handle in the recency list, so lookup,
/// removal and move-to-front are all O(1). Both structures are only ever
/// mutated together.
#[derive(Debug)]
pub struct LruTtlCache<K, V> {
    /// Key to list handle
    index: HashMap<K, usize>,
    /// Entries ordered from most to least recently used
    entries: LruList<CacheEntry<K, V>>,
    /// Maximum number of entries allowed
    capacity: usize,
    /// How expiries are assigned
    policy: ExpiryPolicy,
}

impl<K, V> LruTtlCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    // == Constructors ==
    /// Creates a cache where every write carries its own expiry.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(capacity, ExpiryPolicy::PerEntry)
    }

    /// Fallible counterpart of [`LruTtlCache::new`].
    pub fn try_new(capacity: usize) -> Result<Self> {
        Self::try_with_policy(capacity, ExpiryPolicy::PerEntry)
    }

    /// Creates a cache where every write expires `ttl` after it happens.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries the cache can hold
    /// * `ttl` - Lifetime given to each write; may be negative
    /// * `refresh_on_access` - Whether a successful get restarts the lifetime
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn with_ttl(capacity: usize, ttl: TimeDelta, refresh_on_access: bool) -> Self {
        Self::with_policy(
            capacity,
            ExpiryPolicy::Ttl {
                ttl,
                refresh_on_access,
            },
        )
    }

    /// Fallible counterpart of [`LruTtlCache::with_ttl`].
    pub fn try_with_ttl(capacity: usize, ttl: TimeDelta, refresh_on_access: bool) -> Result<Self> {
        Self::try_with_policy(
            capacity,
            ExpiryPolicy::Ttl {
                ttl,
                refresh_on_access,
            },
        )
    }

    /// Creates a cache with an explicit expiry policy.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn with_policy(capacity: usize, policy: ExpiryPolicy) -> Self {
        assert!(capacity > 0, "{}", INVALID_CAPACITY_MSG);
        Self {
            index: HashMap::with_capacity(capacity),
            entries: LruList::with_capacity(capacity),
            capacity,
            policy,
        }
    }

    pub fn try_with_policy(capacity: usize, policy: ExpiryPolicy) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity(capacity));
        }
        Ok(Self::with_policy(capacity, policy))
    }

    // == Accessors ==
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> ExpiryPolicy {
        self.policy
    }

    // == Add ==
    /// Stores a key-value pair using the policy's expiry.
    ///
    /// If the key already exists, the value and expiry are replaced and the
    /// entry becomes most recently used. If the cache then holds more than
    /// `capacity` entries, the least recently used one is evicted, expired or not.
    pub fn add(&mut self, key: K, value: V) {
        self.add_at(key, value, Utc::now());
    }

    /// Stores a key-value pair that expires at `expires_at`.
    pub fn add_with_expiry(&mut self, key: K, value: V, expires_at: DateTime<Utc>) {
        self.insert(key, value, Some(expires_at));
    }

    pub(crate) fn add_at(&mut self, key: K, value: V, now: DateTime<Utc>) {
        let expires_at = self.policy.expiry_for_add(now);
        self.insert(key, value, expires_at);
    }

    fn insert(&mut self, key: K, value: V, expires_at: Option<DateTime<Utc>>) {
        if let Some(&handle) = self.index.get(&key) {
            if let Some(entry) = self.entries.get_mut(handle) {
                entry.value = value;
                entry.expires_at = expires_at;
                self.entries.move_to_front(handle);
                return;
            }
        }

        let handle = self
            .entries
            .push_front(CacheEntry::new(key.clone(), value, expires_at));
        self.index.insert(key, handle);

        if self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_back() {
                self.index.remove(&evicted.key);
                debug!(capacity = self.capacity, "evicted least recently used entry");
            }
        }
    }

    // == Get ==
    /// Retrieves a copy of the value for `key` if present and not expired.
    ///
    /// A hit makes the entry most recently used and, under a sliding policy,
    /// extends its expiry. An expired entry is removed by the failed lookup.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_at(key, Utc::now())
    }

    pub(crate) fn get_at<Q>(&mut self, key: &Q, now: DateTime<Utc>) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = *self.index.get(key)?;

        let fresh = self
            .entries
            .get(handle)
            .map(|entry| entry.is_fresh_at(now))
            .unwrap_or(false);
        if !fresh {
            self.index.remove(key);
            self.entries.remove(handle);
            trace!("removed expired entry on lookup");
            return None;
        }

        self.entries.move_to_front(handle);
        let refreshed = self.policy.expiry_for_hit(now);
        let entry = self.entries.get_mut(handle)?;
        if refreshed.is_some() {
            entry.expires_at = refreshed;
        }
        Some(entry.value.clone())
    }

    // == Remove ==
    /// Removes an entry by key. Absent keys are ignored.
    pub fn remove<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if let Some(handle) = self.index.remove(key) {
            self.entries.remove(handle);
        }
    }

    // == Length ==
    /// Returns the number of stored entries.
    ///
    /// Expired entries count until something touches or evicts them.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Purge ==
    /// Discards every entry. Capacity and policy are kept.
    pub fn purge(&mut self) {
        let discarded = self.entries.len();
        self.index.clear();
        self.entries.clear();
        debug!(discarded, "purged cache");
    }

    /// Keys from most to least recently used, without touching recency or
    /// checking expiry.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|entry| &entry.key)
    }

    /// Panics if the index and the recency list disagree.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.index.len(), self.entries.len(), "index/list size mismatch");
        assert!(self.entries.len() <= self.capacity, "over capacity");
        for (key, &handle) in &self.index {
            let entry = self.entries.get(handle).expect("index points at a freed slot");
            assert!(entry.key == *key, "index points at the wrong entry");
        }
        assert_eq!(self.entries.iter().count(), self.entries.len());
    }
}

impl<K, V> Cache<K, V> for LruTtlCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn add(&mut self, key: K, value: V) {
        LruTtlCache::add(self, key, value)
    }

    fn add_with_expiry(&mut self, key: K, value: V, expires_at: DateTime<Utc>) {
        LruTtlCache::add_with_expiry(self, key, value, expires_at)
    }

    fn get(&mut self, key: &K) -> Option<V> {
        LruTtlCache::get(self, key)
    }

    fn remove(&mut self, key: &K) {
        LruTtlCache::remove(self, key)
    }

    fn len(&self) -> usize {
        LruTtlCache::len(self)
    }

    fn purge(&mut self) {
        LruTtlCache::purge(self)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn ttl_store(capacity: usize) -> LruTtlCache<String, String> {
        LruTtlCache::with_ttl(capacity, TimeDelta::minutes(5), false)
    }

    fn keys(store: &LruTtlCache<String, String>) -> Vec<&str> {
        store.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_store_new() {
        let store = ttl_store(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 100);
    }

    #[test]
    fn test_store_add_and_get() {
        let mut store = ttl_store(100);

        store.add("key1".to_string(), "value1".to_string());

        assert_eq!(store.get("key1"), Some("value1".to_string()));
        assert_eq!(store.len(), 1);
        store.assert_consistent();
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = ttl_store(100);
        assert_eq!(store.get("nonexistent"), None);
    }

    #[test]
    fn test_store_remove() {
        let mut store = ttl_store(100);

        store.add("key1".to_string(), "value1".to_string());
        store.remove("key1");

        assert!(store.is_empty());
        assert_eq!(store.get("key1"), None);
        store.assert_consistent();
    }

    #[test]
    fn test_store_remove_nonexistent() {
        let mut store = ttl_store(100);

        store.add("key1".to_string(), "value1".to_string());
        store.remove("nonexistent");

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = ttl_store(100);

        store.add("key1".to_string(), "value1".to_string());
        store.add("key1".to_string(), "value2".to_string());

        assert_eq!(store.get("key1"), Some("value2".to_string()));
        assert_eq!(store.len(), 1);
        store.assert_consistent();
    }

    #[test]
    fn test_store_overwrite_moves_to_front() {
        let mut store = ttl_store(3);

        store.add("a".to_string(), "1".to_string());
        store.add("b".to_string(), "2".to_string());
        store.add("c".to_string(), "3".to_string());
        store.add("a".to_string(), "4".to_string());

        assert_eq!(keys(&store), vec!["a", "c", "b"]);

        store.add("d".to_string(), "5".to_string());
        assert_eq!(store.get("b"), None);
        assert_eq!(store.get("a"), Some("4".to_string()));
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = ttl_store(3);

        store.add("key1".to_string(), "value1".to_string());
        store.add("key2".to_string(), "value2".to_string());
        store.add("key3".to_string(), "value3".to_string());

        // Cache is full, adding key4 should evict key1 (oldest)
        store.add("key4".to_string(), "value4".to_string());

        assert_eq!(store.len(), 3);
        assert_eq!(store.get("key1"), None);
        assert!(store.get("key2").is_some());
        assert!(store.get("key3").is_some());
        assert!(store.get("key4").is_some());
        store.assert_consistent();
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = ttl_store(3);

        store.add("key1".to_string(), "value1".to_string());
        store.add("key2".to_string(), "value2".to_string());
        store.add("key3".to_string(), "value3".to_string());

        // Access key1 to make it most recently used
        store.get("key1");

        // Adding key4 should evict key2 (now oldest)
        store.add("key4".to_string(), "value4".to_string());

        assert!(store.get("key1").is_some());
        assert_eq!(store.get("key2"), None);
    }

    #[test]
    fn test_store_evicts_back_entry_regardless_of_expiry() {
        let mut store: LruTtlCache<&str, u32> = LruTtlCache::new(2);
        let now = Utc::now();

        store.add_with_expiry("old", 1, now + TimeDelta::hours(1));
        store.add_with_expiry("stale", 2, now - TimeDelta::hours(1));
        store.add_with_expiry("new", 3, now + TimeDelta::hours(1));

        // "old" is the back of the list, so it goes even though "stale" is dead
        assert_eq!(store.keys().copied().collect::<Vec<_>>(), vec!["new", "stale"]);
    }

    #[test]
    fn test_store_expired_entry_removed_on_get() {
        let mut store: LruTtlCache<&str, &str> = LruTtlCache::new(2);

        store.add_with_expiry("1", "1", Utc::now() - TimeDelta::hours(1));
        assert_eq!(store.len(), 1);

        assert_eq!(store.get("1"), None);
        assert_eq!(store.len(), 0);
        store.assert_consistent();
    }

    #[test]
    fn test_store_negative_ttl_expires_immediately() {
        let mut store = LruTtlCache::with_ttl(2, TimeDelta::seconds(-1), false);

        store.add("k", "v");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("k"), None);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_store_ttl_expiration_at_boundary() {
        let mut store = LruTtlCache::with_ttl(10, TimeDelta::seconds(10), false);
        let start = Utc::now();

        store.add_at("k", "v", start);

        assert_eq!(store.get_at("k", start + TimeDelta::seconds(9)), Some("v"));
        // expiry equal to now is already stale
        assert_eq!(store.get_at("k", start + TimeDelta::seconds(10)), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_absolute_expiry_ignores_access() {
        let mut store = LruTtlCache::with_ttl(10, TimeDelta::seconds(10), false);
        let start = Utc::now();

        store.add_at("k", "v", start);
        for secs in [2, 4, 6, 8] {
            assert_eq!(store.get_at("k", start + TimeDelta::seconds(secs)), Some("v"));
        }

        assert_eq!(store.get_at("k", start + TimeDelta::seconds(11)), None);
    }

    #[test]
    fn test_store_sliding_expiry_keeps_entry_alive() {
        let mut store = LruTtlCache::with_ttl(10, TimeDelta::seconds(10), true);
        let start = Utc::now();

        store.add_at("k", "v", start);

        // Each access lands before the previous lifetime runs out
        let mut now = start;
        for _ in 0..20 {
            now += TimeDelta::seconds(8);
            assert_eq!(store.get_at("k", now), Some("v"));
        }

        // Left alone for a full ttl, it goes
        assert_eq!(store.get_at("k", now + TimeDelta::seconds(10)), None);
    }

    #[test]
    fn test_store_update_resets_ttl() {
        let mut store = LruTtlCache::with_ttl(10, TimeDelta::seconds(10), false);
        let start = Utc::now();

        store.add_at("k", "v1", start);
        store.add_at("k", "v2", start + TimeDelta::seconds(8));

        assert_eq!(store.get_at("k", start + TimeDelta::seconds(15)), Some("v2"));
    }

    #[test]
    fn test_store_explicit_expiry_overrides_ttl() {
        let mut store = LruTtlCache::with_ttl(10, TimeDelta::hours(1), false);

        store.add_with_expiry("k", "v", Utc::now() - TimeDelta::seconds(1));

        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_store_per_entry_without_expiry_never_expires() {
        let mut store = LruTtlCache::new(10);

        store.add("k", "v");

        assert_eq!(store.get_at("k", DateTime::<Utc>::MAX_UTC), Some("v"));
    }

    #[test]
    fn test_store_purge() {
        let mut store = ttl_store(3);

        store.add("key1".to_string(), "value1".to_string());
        store.add("key2".to_string(), "value2".to_string());
        store.purge();

        assert!(store.is_empty());
        assert_eq!(store.get("key1"), None);
        assert_eq!(store.get("key2"), None);
        assert_eq!(store.capacity(), 3);
        store.assert_consistent();

        // Still usable afterwards
        store.add("key3".to_string(), "value3".to_string());
        assert_eq!(store.get("key3"), Some("value3".to_string()));
    }

    #[test]
    fn test_store_capacity_one() {
        let mut store = ttl_store(1);

        store.add("a".to_string(), "1".to_string());
        store.add("b".to_string(), "2".to_string());

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("b"), Some("2".to_string()));
    }

    #[test]
    #[should_panic(expected = "cache: must provide a positive size")]
    fn test_store_zero_capacity_panics() {
        let _ = LruTtlCache::<String, String>::new(0);
    }

    #[test]
    #[should_panic(expected = "cache: must provide a positive size")]
    fn test_store_zero_capacity_with_ttl_panics() {
        let _ = LruTtlCache::<String, String>::with_ttl(0, TimeDelta::seconds(1), true);
    }

    #[test]
    fn test_store_try_constructors() {
        assert_eq!(
            LruTtlCache::<String, String>::try_new(0).unwrap_err(),
            CacheError::InvalidCapacity(0)
        );
        assert_eq!(
            LruTtlCache::<String, String>::try_with_ttl(0, TimeDelta::seconds(1), false)
                .unwrap_err(),
            CacheError::InvalidCapacity(0)
        );

        let store = LruTtlCache::<String, String>::try_with_ttl(5, TimeDelta::seconds(1), true)
            .unwrap();
        assert_eq!(store.capacity(), 5);
        assert_eq!(
            store.policy(),
            ExpiryPolicy::Ttl {
                ttl: TimeDelta::seconds(1),
                refresh_on_access: true
            }
        );
    }
}
