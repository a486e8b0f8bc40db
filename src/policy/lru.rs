//! # Least Recently Used (LRU) cache
//!
//! Recency-ordered eviction: every access refreshes an entry to the
//! most-recent position, and the entry untouched the longest is the next
//! victim.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────────┐
//!   │                         LruCache<K, V>                            │
//!   │                  (parking_lot::Mutex<LruCore>)                    │
//!   │                               │                                   │
//!   │   ┌───────────────────────────▼───────────────────────────────┐   │
//!   │   │                      LruCore<K, V>                        │   │
//!   │   │                                                           │   │
//!   │   │   index: FxHashMap<K, NodeId>                             │   │
//!   │   │     page_1 ───┐                                           │   │
//!   │   │     page_2 ───┼─────┐                                     │   │
//!   │   │     page_3 ───┼─────┼─────┐                               │   │
//!   │   │               ▼     ▼     ▼                               │   │
//!   │   │   list:  HEAD ◄──► [1] ◄──► [2] ◄──► [3] ◄──► TAIL        │   │
//!   │   │            victim side            most-recent side        │   │
//!   │   └───────────────────────────────────────────────────────────┘   │
//!   └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operation flows
//!
//! ```text
//!   put(new key, cache full)          get(existing key)
//!   ─────────────────────────        ──────────────────────
//!   1. pop head victim               1. index lookup  O(1)
//!   2. drop victim from index        2. move node to tail
//!   3. push new node at tail         3. return value
//!   4. index the new node
//! ```
//!
//! Every operation is O(1); a capacity of 0 turns `put` into a silent no-op.
//!
//! ## Thread safety
//!
//! `LruCore` is single-threaded; `LruCache` wraps it in one mutex and is the
//! type to share across threads. Lock hold times are O(1) per operation.

use std::hash::Hash;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::list::{NodeId, SentinelList};
use crate::error::InvariantError;
use crate::traits::CachePolicy;

#[derive(Debug)]
struct LruEntry<K, V> {
    key: K,
    value: V,
}

/// Single-threaded LRU core: recency list plus key index.
///
/// Composable building block — the adaptive and history wrappers embed
/// cores rather than locked caches. Use [`LruCache`] for shared access.
///
/// # Example
///
/// ```
/// use evictkit::policy::lru::LruCore;
///
/// let mut core = LruCore::new(2);
/// core.put(1, "one");
/// core.put(2, "two");
/// core.put(3, "three");          // evicts 1, the oldest
///
/// assert!(!core.contains(&1));
/// assert_eq!(core.get(&2), Some(&"two"));
/// assert_eq!(core.peek_victim().map(|(k, _)| *k), Some(3));
/// ```
#[derive(Debug)]
pub struct LruCore<K, V> {
    list: SentinelList<LruEntry<K, V>>,
    index: FxHashMap<K, NodeId>,
    capacity: usize,
}

impl<K, V> LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a core holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            list: SentinelList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
        }
    }

    /// Inserts or overwrites `key`, evicting the least recent entry when
    /// full. Capacity 0 drops the call.
    pub fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.list.get_mut(id) {
                entry.value = value;
            }
            self.list.move_to_tail(id);
            return;
        }
        if self.index.len() >= self.capacity {
            self.evict_victim();
        }
        let id = self.list.push_tail(LruEntry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);
    }

    /// Looks up `key` and refreshes it to the most-recent position.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.list.move_to_tail(id);
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Looks up `key` without refreshing recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Removes `key`, returning its value if present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        self.list.remove(id).map(|entry| entry.value)
    }

    /// Removes and returns the current eviction victim.
    pub fn pop_victim(&mut self) -> Option<(K, V)> {
        let entry = self.list.pop_head()?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value))
    }

    /// Returns the current eviction victim without removing it.
    pub fn peek_victim(&self) -> Option<(&K, &V)> {
        self.list.peek_head().map(|entry| (&entry.key, &entry.value))
    }

    /// Returns `true` if `key` is resident.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the number of resident entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    fn evict_victim(&mut self) {
        if let Some(entry) = self.list.pop_head() {
            self.index.remove(&entry.key);
        }
    }

    /// Verifies the index and recency list agree; returns a description of
    /// the first violation found.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but list holds {} nodes",
                self.index.len(),
                self.list.len()
            )));
        }
        if self.index.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                self.index.len(),
                self.capacity
            )));
        }
        for (key, &id) in &self.index {
            match self.list.get(id) {
                Some(entry) if &entry.key == key => {}
                _ => {
                    return Err(InvariantError::new(
                        "index entry does not resolve to its list node",
                    ));
                }
            }
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.check_invariants().expect("lru invariants violated");
        self.list.debug_validate_invariants();
    }
}

/// Thread-safe LRU cache: one mutex around an [`LruCore`].
///
/// # Example
///
/// ```
/// use evictkit::policy::lru::LruCache;
///
/// let cache = LruCache::new(3);
/// cache.put(1, "a");
/// cache.put(2, "b");
/// cache.put(3, "c");
///
/// // Touching 1 makes 2 the eviction victim.
/// cache.get(&1);
/// cache.put(4, "d");
///
/// assert!(!cache.contains(&2));
/// assert!(cache.contains(&1));
/// assert!(cache.contains(&3));
/// assert!(cache.contains(&4));
/// ```
#[derive(Debug)]
pub struct LruCache<K, V> {
    core: Mutex<LruCore<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            core: Mutex::new(LruCore::new(capacity)),
        }
    }

    /// Inserts or overwrites `key`.
    pub fn put(&self, key: K, value: V) {
        self.core.lock().put(key, value);
    }

    /// Looks up `key`, refreshing its recency. `None` on a miss.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.core.lock().get(key).cloned()
    }

    /// Removes `key`, returning its value if present.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.core.lock().remove(key)
    }

    /// Returns `true` if `key` is resident. Does not refresh recency.
    pub fn contains(&self, key: &K) -> bool {
        self.core.lock().contains(key)
    }

    /// Returns the number of resident entries.
    pub fn len(&self) -> usize {
        self.core.lock().len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.core.lock().is_empty()
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.core.lock().capacity()
    }

    /// Drops every entry.
    pub fn purge(&self) {
        self.core.lock().clear();
    }

    /// Validates internal invariants without panicking.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.core.lock().check_invariants()
    }
}

impl<K, V> CachePolicy<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        LruCache::put(self, key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        LruCache::get(self, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_put_get_and_overwrite() {
        let mut core = LruCore::new(4);
        core.put(1, "a");
        assert_eq!(core.get(&1), Some(&"a"));

        core.put(1, "b");
        assert_eq!(core.get(&1), Some(&"b"));
        assert_eq!(core.len(), 1);
        core.debug_validate_invariants();
    }

    #[test]
    fn core_evicts_least_recent() {
        let mut core = LruCore::new(2);
        core.put(1, 10);
        core.put(2, 20);
        core.put(3, 30);

        assert!(!core.contains(&1));
        assert!(core.contains(&2));
        assert!(core.contains(&3));
        assert_eq!(core.len(), 2);
    }

    #[test]
    fn get_refreshes_eviction_order() {
        let mut core = LruCore::new(3);
        core.put(1, ());
        core.put(2, ());
        core.put(3, ());

        core.get(&1);
        core.put(4, ());

        // 2 was the least recent after 1 was refreshed.
        assert!(!core.contains(&2));
        assert!(core.contains(&1));
        assert!(core.contains(&3));
        assert!(core.contains(&4));
    }

    #[test]
    fn overwrite_also_refreshes() {
        let mut core = LruCore::new(2);
        core.put(1, "a");
        core.put(2, "b");
        core.put(1, "a2");
        core.put(3, "c");

        assert!(core.contains(&1));
        assert!(!core.contains(&2));
        assert!(core.contains(&3));
    }

    #[test]
    fn peek_does_not_refresh() {
        let mut core = LruCore::new(2);
        core.put(1, "a");
        core.put(2, "b");

        assert_eq!(core.peek(&1), Some(&"a"));
        core.put(3, "c");

        // 1 was still the victim despite the peek.
        assert!(!core.contains(&1));
    }

    #[test]
    fn remove_and_victim_accessors() {
        let mut core = LruCore::new(3);
        core.put(1, "a");
        core.put(2, "b");
        core.put(3, "c");

        assert_eq!(core.remove(&2), Some("b"));
        assert_eq!(core.remove(&2), None);
        assert_eq!(core.peek_victim().map(|(k, _)| *k), Some(1));
        assert_eq!(core.pop_victim(), Some((1, "a")));
        assert_eq!(core.len(), 1);
        core.debug_validate_invariants();
    }

    #[test]
    fn zero_capacity_put_is_noop() {
        let mut core = LruCore::new(0);
        core.put(1, "a");
        assert!(core.is_empty());
        assert_eq!(core.get(&1), None);
        assert_eq!(core.capacity(), 0);
    }

    #[test]
    fn clear_resets_state() {
        let mut core = LruCore::new(3);
        core.put(1, "a");
        core.put(2, "b");
        core.clear();

        assert!(core.is_empty());
        assert!(!core.contains(&1));

        core.put(5, "e");
        assert_eq!(core.get(&5), Some(&"e"));
        core.debug_validate_invariants();
    }

    #[test]
    fn shared_cache_basic_flow() {
        let cache = LruCache::new(2);
        cache.put(1, "a".to_string());
        cache.put(2, "b".to_string());
        cache.put(3, "c".to_string());

        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2).as_deref(), Some("b"));
        assert_eq!(cache.len(), 2);
        assert!(cache.check_invariants().is_ok());

        cache.purge();
        assert!(cache.is_empty());
    }

    #[test]
    fn shared_cache_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LruCache<u64, String>>();
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    /// Reference model: a deque of (key, value) with the most recent at the
    /// back.
    struct ModelLru {
        entries: VecDeque<(u32, u32)>,
        capacity: usize,
    }

    impl ModelLru {
        fn put(&mut self, key: u32, value: u32) {
            if self.capacity == 0 {
                return;
            }
            if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key) {
                self.entries.remove(pos);
            } else if self.entries.len() >= self.capacity {
                self.entries.pop_front();
            }
            self.entries.push_back((key, value));
        }

        fn get(&mut self, key: u32) -> Option<u32> {
            let pos = self.entries.iter().position(|(k, _)| *k == key)?;
            let entry = self.entries.remove(pos).unwrap();
            self.entries.push_back(entry);
            Some(entry.1)
        }
    }

    proptest! {
        /// Contents and eviction order match the reference model after any
        /// operation sequence (properties P1 and P2).
        #[test]
        fn matches_reference_model(
            capacity in 0usize..8,
            ops in prop::collection::vec((any::<bool>(), 0u32..12, any::<u32>()), 0..150),
        ) {
            let mut core: LruCore<u32, u32> = LruCore::new(capacity);
            let mut model = ModelLru {
                entries: VecDeque::new(),
                capacity,
            };

            for (is_put, key, value) in ops {
                if is_put {
                    core.put(key, value);
                    model.put(key, value);
                } else {
                    prop_assert_eq!(core.get(&key).copied(), model.get(key));
                }

                prop_assert_eq!(core.len(), model.entries.len());
                prop_assert!(core.len() <= capacity);
                prop_assert_eq!(
                    core.peek_victim().map(|(k, _)| *k),
                    model.entries.front().map(|(k, _)| *k)
                );
                core.debug_validate_invariants();
            }
        }
    }
}
