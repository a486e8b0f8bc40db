//! Bounded recency list of evicted keys.
//!
//! Adaptive policies keep a "ghost" record of keys that were recently pushed
//! out of a live cache: the key alone is retained, never the value. A hit on
//! a ghost entry means "this key would still be resident if this half of the
//! cache were bigger", which is the signal the adaptive engine uses to move
//! capacity between its halves.
//!
//! Keys are appended on the tail side and the head-adjacent (oldest) key is
//! dropped when the list is full. Re-recording a key refreshes it to the
//! tail. A capacity of 0 produces a list that ignores every `record`.

use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::ds::list::{NodeId, SentinelList};

/// Bounded key-only recency list used for ghost bookkeeping.
///
/// # Example
///
/// ```
/// use evictkit::ds::GhostList;
///
/// let mut ghost = GhostList::new(2);
/// ghost.record("a");
/// ghost.record("b");
///
/// // Full: recording a third key drops the oldest.
/// ghost.record("c");
/// assert!(!ghost.contains(&"a"));
/// assert!(ghost.contains(&"b"));
/// assert!(ghost.contains(&"c"));
///
/// // A ghost hit consumes the entry.
/// assert!(ghost.remove(&"b"));
/// assert!(!ghost.contains(&"b"));
/// ```
#[derive(Debug)]
pub struct GhostList<K> {
    list: SentinelList<K>,
    index: FxHashMap<K, NodeId>,
    capacity: usize,
}

impl<K> GhostList<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates a ghost list holding at most `capacity` keys.
    pub fn new(capacity: usize) -> Self {
        Self {
            list: SentinelList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
        }
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns `true` if `key` is tracked.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Records `key` as the most recent ghost, dropping the oldest key if
    /// the list is full. Re-recording an existing key refreshes it.
    pub fn record(&mut self, key: K) {
        if self.capacity == 0 {
            return;
        }
        if let Some(&id) = self.index.get(&key) {
            self.list.move_to_tail(id);
            return;
        }
        if self.list.len() >= self.capacity {
            if let Some(oldest) = self.list.pop_head() {
                self.index.remove(&oldest);
            }
        }
        let id = self.list.push_tail(key.clone());
        self.index.insert(key, id);
    }

    /// Removes `key`; returns `true` if it was tracked.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(id) => {
                self.list.remove(id);
                true
            }
            None => false,
        }
    }

    /// Drops every tracked key.
    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }
}

impl<K> GhostList<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.list.len(), self.index.len());
        assert!(self.list.len() <= self.capacity);
        for (key, &id) in &self.index {
            assert_eq!(self.list.get(id), Some(key));
        }
        self.list.debug_validate_invariants();
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    proptest! {
        /// Behavior matches a VecDeque reference model (newest at the back).
        #[test]
        fn matches_deque_model(
            capacity in 1usize..8,
            keys in prop::collection::vec(0u32..16, 0..60),
        ) {
            let mut ghost: GhostList<u32> = GhostList::new(capacity);
            let mut model: VecDeque<u32> = VecDeque::new();

            for key in keys {
                ghost.record(key);

                if let Some(pos) = model.iter().position(|&k| k == key) {
                    model.remove(pos);
                } else if model.len() >= capacity {
                    model.pop_front();
                }
                model.push_back(key);

                prop_assert_eq!(ghost.len(), model.len());
                for k in &model {
                    prop_assert!(ghost.contains(k));
                }
                ghost.debug_validate_invariants();
            }
        }

        /// Length never exceeds capacity, including after interleaved removes.
        #[test]
        fn bounded_by_capacity(
            capacity in 0usize..10,
            ops in prop::collection::vec((any::<bool>(), 0u32..20), 0..80),
        ) {
            let mut ghost: GhostList<u32> = GhostList::new(capacity);
            for (is_record, key) in ops {
                if is_record {
                    ghost.record(key);
                } else {
                    ghost.remove(&key);
                }
                prop_assert!(ghost.len() <= capacity);
            }
        }
    }
}
