//! Deterministic key-to-shard mapping.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Maps hashable keys to a shard index in `[0, shards)`.
///
/// The mapping is a pure function of `(key, seed, shards)`: the same key
/// always lands on the same shard for a given selector, which is what makes
/// sharded caches route repeatably.
///
/// # Example
///
/// ```
/// use evictkit::ds::ShardSelector;
///
/// let selector = ShardSelector::new(4, 0);
/// let shard = selector.shard_for_key(&"user:42");
/// assert!(shard < 4);
/// assert_eq!(selector.shard_for_key(&"user:42"), shard);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector for `shards` shards; a count of 0 is clamped to 1.
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: shards.max(1),
            seed,
        }
    }

    /// Returns the number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards
    }

    /// Maps `key` to a shard index in `[0, shards)`.
    pub fn shard_for_key<K: Hash>(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards
    }
}

impl Default for ShardSelector {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_is_deterministic() {
        let selector = ShardSelector::new(8, 7);
        let first = selector.shard_for_key(&"key");
        assert_eq!(selector.shard_for_key(&"key"), first);
        assert!(first < 8);
    }

    #[test]
    fn zero_shards_clamps_to_one() {
        let selector = ShardSelector::new(0, 0);
        assert_eq!(selector.shard_count(), 1);
        assert_eq!(selector.shard_for_key(&123u64), 0);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn shard_always_in_range(
            shards in 1usize..64,
            seed in any::<u64>(),
            keys in prop::collection::vec(any::<u64>(), 0..50),
        ) {
            let selector = ShardSelector::new(shards, seed);
            for key in keys {
                prop_assert!(selector.shard_for_key(&key) < shards);
            }
        }

        #[test]
        fn same_key_same_shard(
            shards in 1usize..64,
            seed in any::<u64>(),
            key in any::<u32>(),
        ) {
            let selector = ShardSelector::new(shards, seed);
            let a = selector.shard_for_key(&key);
            let b = selector.shard_for_key(&key);
            prop_assert_eq!(a, b);
        }
    }
}
