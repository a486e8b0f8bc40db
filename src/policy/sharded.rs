//! # Hash-sharded cache wrapper
//!
//! Partitions a keyspace across N independent caches, each with its own
//! lock, so unrelated keys never contend:
//!
//! ```text
//!              put/get(key)
//!                   │
//!                   ▼
//!        shard = hash(key) mod N
//!                   │
//!     ┌─────────┬───┴─────┬─────────┐
//!     ▼         ▼         ▼         ▼
//!  ┌───────┐ ┌───────┐ ┌───────┐ ┌───────┐
//!  │shard 0│ │shard 1│ │shard 2│ │shard 3│   each a full cache instance
//!  └───────┘ └───────┘ └───────┘ └───────┘   with its own mutex
//! ```
//!
//! The wrapper adds no cross-shard coordination: capacity is divided as
//! `ceil(total / N)` per shard, and a skewed key distribution can fill one
//! shard while its neighbors sit empty. Routing is deterministic, so a key
//! always returns to the shard that holds it.

use std::hash::Hash;
use std::marker::PhantomData;

use crate::ds::shard::ShardSelector;
use crate::policy::lfu::LfuCache;
use crate::policy::lru::LruCache;
use crate::traits::CachePolicy;

/// Fan-out wrapper owning a fixed vector of independent shard caches.
///
/// `slices = 0` sizes the shard count to the host's available parallelism
/// (clamped to at least 1).
///
/// # Example
///
/// ```
/// use evictkit::policy::sharded::ShardedCache;
///
/// let cache = ShardedCache::lru(100, 4);
/// cache.put(1, "one");
/// assert_eq!(cache.get(&1), Some("one"));
/// assert_eq!(cache.shard_count(), 4);
/// ```
pub struct ShardedCache<K, V, C> {
    shards: Vec<C>,
    selector: ShardSelector,
    capacity: usize,
    _marker: PhantomData<fn(K) -> V>,
}

impl<K, V, C> ShardedCache<K, V, C> {
    /// Creates a sharded cache over `slices` shards, calling `make_shard`
    /// with the per-shard capacity `ceil(capacity / slices)` once per
    /// shard.
    pub fn with_shards(
        capacity: usize,
        slices: usize,
        mut make_shard: impl FnMut(usize) -> C,
    ) -> Self {
        let slice_count = if slices == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            slices
        };
        let shard_capacity = capacity.div_ceil(slice_count);
        let shards = (0..slice_count).map(|_| make_shard(shard_capacity)).collect();
        Self {
            shards,
            selector: ShardSelector::new(slice_count, 0),
            capacity,
            _marker: PhantomData,
        }
    }

    /// Number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Total requested capacity. Per-shard rounding may make the sum of
    /// shard capacities slightly larger.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The shard caches, indexed by [`shard_index`](Self::shard_index).
    pub fn shards(&self) -> &[C] {
        &self.shards
    }

    /// The shard that `key` routes to.
    pub fn shard_index(&self, key: &K) -> usize
    where
        K: Hash,
    {
        self.selector.shard_for_key(key)
    }
}

impl<K, V, C> ShardedCache<K, V, C>
where
    K: Hash,
    C: CachePolicy<K, V>,
{
    /// Routes `key` to its shard and inserts there.
    pub fn put(&self, key: K, value: V) {
        let shard = self.selector.shard_for_key(&key);
        self.shards[shard].put(key, value);
    }

    /// Routes `key` to its shard and looks it up there.
    pub fn get(&self, key: &K) -> Option<V> {
        let shard = self.selector.shard_for_key(key);
        self.shards[shard].get(key)
    }
}

impl<K, V> ShardedCache<K, V, LruCache<K, V>>
where
    K: Eq + Hash + Clone,
{
    /// Sharded LRU: `slices` independent [`LruCache`] shards.
    pub fn lru(capacity: usize, slices: usize) -> Self {
        Self::with_shards(capacity, slices, LruCache::new)
    }
}

impl<K, V> ShardedCache<K, V, LfuCache<K, V>>
where
    K: Eq + Hash + Clone,
{
    /// Sharded LFU: `slices` independent [`LfuCache`] shards.
    pub fn lfu(capacity: usize, slices: usize) -> Self {
        Self::with_shards(capacity, slices, LfuCache::new)
    }
}

impl<K, V, C> CachePolicy<K, V> for ShardedCache<K, V, C>
where
    K: Hash,
    C: CachePolicy<K, V>,
{
    fn put(&self, key: K, value: V) {
        ShardedCache::put(self, key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        ShardedCache::get(self, key)
    }
}

impl<K, V, C: std::fmt::Debug> std::fmt::Debug for ShardedCache<K, V, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedCache")
            .field("capacity", &self.capacity)
            .field("shards", &self.shards)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_are_deterministic() {
        let cache: ShardedCache<u64, u64, _> = ShardedCache::lru(64, 4);
        for key in 0u64..100 {
            let first = cache.shard_index(&key);
            assert_eq!(cache.shard_index(&key), first);
            assert!(first < 4);
        }
    }

    #[test]
    fn put_and_get_round_trip_across_shards() {
        let cache = ShardedCache::lru(64, 4);
        for key in 0u64..32 {
            cache.put(key, key * 2);
        }
        for key in 0u64..32 {
            assert_eq!(cache.get(&key), Some(key * 2));
        }
    }

    #[test]
    fn per_shard_capacity_is_ceiling_division() {
        let cache: ShardedCache<u64, u64, _> = ShardedCache::lru(10, 3);
        for shard in cache.shards() {
            assert_eq!(shard.capacity(), 4);
        }
        assert_eq!(cache.capacity(), 10);
    }

    #[test]
    fn zero_slices_defaults_to_available_parallelism() {
        let cache: ShardedCache<u64, u64, _> = ShardedCache::lru(16, 0);
        assert!(cache.shard_count() >= 1);
    }

    #[test]
    fn shards_evict_independently() {
        let cache: ShardedCache<u64, u64, _> = ShardedCache::lru(4, 2);
        // Per-shard capacity is 2. Route three keys into one shard: it
        // must evict even though the other shard is empty.
        let target = cache.shard_index(&0);
        let keys: Vec<u64> = (0..).filter(|k| cache.shard_index(k) == target).take(3).collect();

        for &key in &keys {
            cache.put(key, key);
        }

        let loaded = &cache.shards()[target];
        assert_eq!(loaded.len(), 2);
        assert!(!loaded.contains(&keys[0]), "oldest key evicted in-shard");

        let other = &cache.shards()[1 - target];
        assert_eq!(other.len(), 0);
    }

    #[test]
    fn sharded_lfu_tracks_frequency_per_shard() {
        let cache: ShardedCache<u64, u64, _> = ShardedCache::lfu(8, 2);
        cache.put(1, 10);
        cache.get(&1);
        let shard = &cache.shards()[cache.shard_index(&1)];
        assert_eq!(shard.frequency(&1), Some(2));
    }

    #[test]
    fn wrapper_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ShardedCache<u64, String, LruCache<u64, String>>>();
    }
}
