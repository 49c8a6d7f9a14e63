//! Locked Cache Module
//!
//! Thread-safe wrapper that serializes every operation on a single engine.

use std::borrow::Borrow;
use std::hash::Hash;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;

use crate::cache::{Cache, ExpiryPolicy, LruTtlCache};
use crate::error::Result;

// == Locked Cache ==
/// [`LruTtlCache`] behind one exclusive lock.
///
/// Every call holds the lock for its whole duration, so operations are atomic
/// with respect to each other. Gets take the same exclusive lock as writes
/// because a hit reorders the list and may refresh or drop the entry.
///
/// Share it between threads with `Arc<LockedCache<K, V>>`.
#[derive(Debug)]
pub struct LockedCache<K, V> {
    inner: Mutex<LruTtlCache<K, V>>,
}

impl<K, V> LockedCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    // == Constructors ==
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        Self::from_cache(LruTtlCache::new(capacity))
    }

    pub fn try_new(capacity: usize) -> Result<Self> {
        LruTtlCache::try_new(capacity).map(Self::from_cache)
    }

    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn with_ttl(capacity: usize, ttl: TimeDelta, refresh_on_access: bool) -> Self {
        Self::from_cache(LruTtlCache::with_ttl(capacity, ttl, refresh_on_access))
    }

    pub fn try_with_ttl(capacity: usize, ttl: TimeDelta, refresh_on_access: bool) -> Result<Self> {
        LruTtlCache::try_with_ttl(capacity, ttl, refresh_on_access).map(Self::from_cache)
    }

    pub fn try_with_policy(capacity: usize, policy: ExpiryPolicy) -> Result<Self> {
        LruTtlCache::try_with_policy(capacity, policy).map(Self::from_cache)
    }

    /// Takes ownership of an engine. Nothing else can reach it afterwards.
    pub fn from_cache(cache: LruTtlCache<K, V>) -> Self {
        Self {
            inner: Mutex::new(cache),
        }
    }

    /// Unwraps the engine.
    pub fn into_inner(self) -> LruTtlCache<K, V> {
        self.inner.into_inner()
    }

    // == Operations ==
    pub fn add(&self, key: K, value: V) {
        self.inner.lock().add(key, value);
    }

    pub fn add_with_expiry(&self, key: K, value: V, expires_at: DateTime<Utc>) {
        self.inner.lock().add_with_expiry(key, value, expires_at);
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().get(key)
    }

    pub fn remove<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().remove(key);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn purge(&self) {
        self.inner.lock().purge();
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn policy(&self) -> ExpiryPolicy {
        self.inner.lock().policy()
    }
}

impl<K, V> Cache<K, V> for LockedCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn add(&mut self, key: K, value: V) {
        LockedCache::add(self, key, value)
    }

    fn add_with_expiry(&mut self, key: K, value: V, expires_at: DateTime<Utc>) {
        LockedCache::add_with_expiry(self, key, value, expires_at)
    }

    fn get(&mut self, key: &K) -> Option<V> {
        LockedCache::get(self, key)
    }

    fn remove(&mut self, key: &K) {
        LockedCache::remove(self, key)
    }

    fn len(&self) -> usize {
        LockedCache::len(self)
    }

    fn purge(&mut self) {
        LockedCache::purge(self)
    }
}
