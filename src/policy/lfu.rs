//! # Least Frequently Used (LFU) cache with frequency aging
//!
//! Frequency-ordered eviction over [`FrequencyBuckets`]: every counted
//! access promotes an entry one bucket up, and the victim is the head of the
//! lowest populated bucket (least frequent, then least recently promoted
//! into that frequency).
//!
//! ## Aging
//!
//! Raw LFU has a pathology: an entry that was hot long ago keeps a huge
//! counter and can never be displaced by newly hot entries. This engine
//! tracks the total of all live frequencies and, whenever the average
//! frequency exceeds `max_average_freq` after an access, lowers every
//! frequency by `max_average_freq / 2` (clamped at 1) in one O(n) pass:
//!
//! ```text
//!   access ──► total_freq += 1
//!          ──► total_freq / len > max_average_freq ?
//!                  │ yes
//!                  ▼
//!          every entry: freq = max(1, freq - max_average_freq / 2)
//!          re-bucket, recompute min_freq and total_freq
//! ```
//!
//! The pass is amortized across the many accesses needed to push the
//! average back over the threshold. Evictions subtract the victim's
//! frequency from the total so the average tracks live entries only.

use std::hash::Hash;

use parking_lot::Mutex;

use crate::ds::freq_buckets::FrequencyBuckets;
use crate::error::{ConfigError, InvariantError};
use crate::traits::CachePolicy;

/// Default aging threshold for the average frequency.
pub const DEFAULT_MAX_AVERAGE_FREQ: u64 = 10;

/// Single-threaded LFU core. Use [`LfuCache`] for shared access.
#[derive(Debug)]
pub struct LfuCore<K, V> {
    buckets: FrequencyBuckets<K, V>,
    capacity: usize,
    max_average_freq: u64,
}

impl<K, V> LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a core with the default aging threshold.
    pub fn new(capacity: usize) -> Self {
        Self::with_max_average_freq(capacity, DEFAULT_MAX_AVERAGE_FREQ)
    }

    /// Creates a core that triggers aging once the average frequency
    /// exceeds `max_average_freq`.
    pub fn with_max_average_freq(capacity: usize, max_average_freq: u64) -> Self {
        Self {
            buckets: FrequencyBuckets::with_capacity(capacity),
            capacity,
            max_average_freq,
        }
    }

    /// Inserts or overwrites `key`. An overwrite counts as an access; a new
    /// entry starts at frequency 1 and evicts the min-frequency victim when
    /// full. Capacity 0 drops the call.
    pub fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if self.buckets.contains(&key) {
            self.buckets.replace_value(&key, value);
            self.buckets.touch(&key);
            self.maybe_age();
            return;
        }
        if self.buckets.len() >= self.capacity {
            self.buckets.pop_min();
        }
        self.buckets.insert(key, value);
        self.maybe_age();
    }

    /// Looks up `key`, counting the access.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.buckets.touch(key)?;
        self.maybe_age();
        self.buckets.get_value(key)
    }

    /// Removes `key`, returning its value if present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.buckets.remove(key).map(|(value, _)| value)
    }

    /// Returns the access frequency recorded for `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.buckets.frequency(key)
    }

    /// Returns the current eviction victim without removing it.
    pub fn peek_victim(&self) -> Option<(&K, u64)> {
        self.buckets.peek_min()
    }

    /// Returns `true` if `key` is resident.
    pub fn contains(&self, key: &K) -> bool {
        self.buckets.contains(key)
    }

    /// Returns the number of resident entries.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the aging threshold.
    pub fn max_average_freq(&self) -> u64 {
        self.max_average_freq
    }

    /// Drops every entry and resets the frequency bookkeeping.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    fn maybe_age(&mut self) {
        let len = self.buckets.len() as u64;
        if len == 0 {
            return;
        }
        if self.buckets.total_freq() / len > self.max_average_freq {
            self.buckets.age_all(self.max_average_freq / 2);
        }
    }

    /// Verifies capacity and frequency bookkeeping; returns the first
    /// violation found.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.buckets.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                self.buckets.len(),
                self.capacity
            )));
        }
        let min = self.buckets.min_freq().unwrap_or(0);
        for key in self.buckets.keys() {
            let freq = self
                .buckets
                .frequency(key)
                .ok_or_else(|| InvariantError::new("indexed key has no frequency"))?;
            if freq < min {
                return Err(InvariantError::new(format!(
                    "entry frequency {freq} is below tracked minimum {min}"
                )));
            }
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.check_invariants().expect("lfu invariants violated");
        self.buckets.debug_validate_invariants();
    }
}

/// Thread-safe LFU cache: one mutex around an [`LfuCore`].
///
/// # Example
///
/// ```
/// use evictkit::policy::lfu::LfuCache;
///
/// let cache = LfuCache::new(2);
/// cache.put(1, "a");
/// cache.put(2, "b");
/// cache.get(&1);                 // 1 now has frequency 2
/// cache.put(3, "c");             // evicts 2, the least frequent
///
/// assert!(cache.contains(&1));
/// assert!(!cache.contains(&2));
/// assert!(cache.contains(&3));
/// ```
#[derive(Debug)]
pub struct LfuCache<K, V> {
    core: Mutex<LfuCore<K, V>>,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache with the default aging threshold of
    /// [`DEFAULT_MAX_AVERAGE_FREQ`].
    pub fn new(capacity: usize) -> Self {
        Self {
            core: Mutex::new(LfuCore::new(capacity)),
        }
    }

    /// Creates a cache with an explicit aging threshold.
    ///
    /// Returns a [`ConfigError`] when `max_average_freq < 2` — below that
    /// the aging decrement `max_average_freq / 2` degenerates to zero.
    pub fn try_with_max_average_freq(
        capacity: usize,
        max_average_freq: u64,
    ) -> Result<Self, ConfigError> {
        if max_average_freq < 2 {
            return Err(ConfigError::new(format!(
                "max_average_freq must be >= 2, got {max_average_freq}"
            )));
        }
        Ok(Self {
            core: Mutex::new(LfuCore::with_max_average_freq(capacity, max_average_freq)),
        })
    }

    /// Inserts or overwrites `key`.
    pub fn put(&self, key: K, value: V) {
        self.core.lock().put(key, value);
    }

    /// Looks up `key`, counting the access. `None` on a miss.
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

    /// Returns the access frequency recorded for `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.core.lock().frequency(key)
    }

    /// Returns `true` if `key` is resident.
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

impl<K, V> CachePolicy<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        LfuCache::put(self, key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        LfuCache::get(self, key)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The victim is always among the least-frequent entries (P3), and
        /// invariants hold throughout.
        #[test]
        fn victim_is_least_frequent(
            capacity in 1usize..6,
            ops in prop::collection::vec((any::<bool>(), 0u32..10), 1..100),
        ) {
            let mut core: LfuCore<u32, u32> = LfuCore::new(capacity);

            for (is_put, key) in ops {
                if is_put {
                    core.put(key, key);
                } else {
                    let _ = core.get(&key);
                }

                if let Some((victim, victim_freq)) = core.peek_victim() {
                    let victim = *victim;
                    for key in 0u32..10 {
                        if let Some(freq) = core.frequency(&key) {
                            prop_assert!(
                                freq >= victim_freq,
                                "victim {} freq {} but {} has {}",
                                victim, victim_freq, key, freq
                            );
                        }
                    }
                }
                prop_assert!(core.len() <= capacity);
                core.debug_validate_invariants();
            }
        }
    }
}
