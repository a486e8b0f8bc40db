//! # LRU-K promotion wrapper
//!
//! Guards a main LRU cache behind an access-count filter: a key only enters
//! the main cache once it has been referenced `k` times. The counts live in
//! their own small LRU history cache, so cold keys age out of the history
//! the same way they would age out of a cache.
//!
//! ```text
//!   put(key, value)
//!        │
//!        ▼
//!   history[key] += 1 ──── count < K ──► value dropped (scan protection)
//!        │
//!        count ≥ K
//!        ▼
//!   history.remove(key); main.put(key, value)
//! ```
//!
//! One-shot scans touch each key once, so they churn only the history and
//! never displace proven entries from the main cache.
//!
//! The history is consulted through its miss-distinguishing `Option` API;
//! an absent key and a key with a default-valued count are never confused.

use std::hash::Hash;

use crate::error::{ConfigError, InvariantError};
use crate::policy::lru::LruCache;
use crate::traits::CachePolicy;

/// LRU cache with K-access admission.
///
/// # Example
///
/// ```
/// use evictkit::policy::lru_k::LruKCache;
///
/// let cache = LruKCache::new(4, 16, 2);
///
/// // First put only records interest.
/// cache.put(1, "warm");
/// assert_eq!(cache.get(&1), None);
///
/// // Second put proves it and admits the entry.
/// cache.put(1, "warm");
/// assert_eq!(cache.get(&1), Some("warm"));
/// ```
#[derive(Debug)]
pub struct LruKCache<K, V> {
    main: LruCache<K, V>,
    history: LruCache<K, u64>,
    k: u64,
}

impl<K, V> LruKCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a cache with `capacity` main entries, `history_capacity`
    /// tracked candidates, and promotion threshold `k`.
    pub fn new(capacity: usize, history_capacity: usize, k: u64) -> Self {
        Self {
            main: LruCache::new(capacity),
            history: LruCache::new(history_capacity),
            k,
        }
    }

    /// Validating constructor: requires `k >= 1`.
    pub fn try_new(capacity: usize, history_capacity: usize, k: u64) -> Result<Self, ConfigError> {
        if k == 0 {
            return Err(ConfigError::new("k must be >= 1"));
        }
        Ok(Self::new(capacity, history_capacity, k))
    }

    /// Records an access for `key` and returns the main cache's answer,
    /// which may well be a miss for a key still on probation.
    pub fn get(&self, key: &K) -> Option<V> {
        let count = self.history.get(key).unwrap_or(0) + 1;
        self.history.put(key.clone(), count);
        self.main.get(key)
    }

    /// Overwrites `key` if already admitted, records the access, and admits
    /// the entry once its observed count reaches the threshold.
    pub fn put(&self, key: K, value: V) {
        if self.main.contains(&key) {
            self.main.put(key.clone(), value.clone());
        }

        let count = self.history.get(&key).unwrap_or(0) + 1;
        self.history.put(key.clone(), count);

        if count >= self.k {
            self.history.remove(&key);
            self.main.put(key, value);
        }
    }

    /// Returns `true` if `key` has been admitted to the main cache.
    pub fn contains(&self, key: &K) -> bool {
        self.main.contains(key)
    }

    /// Number of admitted entries.
    pub fn len(&self) -> usize {
        self.main.len()
    }

    /// Returns `true` if no entries have been admitted.
    pub fn is_empty(&self) -> bool {
        self.main.is_empty()
    }

    /// Main cache capacity.
    pub fn capacity(&self) -> usize {
        self.main.capacity()
    }

    /// Number of keys currently on probation.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Promotion threshold.
    pub fn k_value(&self) -> u64 {
        self.k
    }

    /// Drops admitted entries and probation history alike.
    pub fn purge(&self) {
        self.main.purge();
        self.history.purge();
    }

    /// Validates both sub-caches.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.main.check_invariants()?;
        self.history.check_invariants()
    }
}

impl<K, V> CachePolicy<K, V> for LruKCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        LruKCache::put(self, key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        LruKCache::get(self, key)
    }
}
