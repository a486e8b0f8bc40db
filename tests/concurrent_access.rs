// ==============================================
// CONCURRENT ACCESS TESTS (integration)
// ==============================================
//
// Hammer the shared cache types from many threads at once. These tests
// assert freedom from panics and deadlocks plus the invariants each engine
// promises to restore after every public operation; they deliberately do
// not assert cross-call orderings, which the policies do not guarantee
// under concurrency.

use std::sync::Arc;
use std::thread;

use evictkit::policy::arc::ArcCache;
use evictkit::policy::lfu::LfuCache;
use evictkit::policy::lru::LruCache;
use evictkit::policy::sharded::ShardedCache;

const THREADS: usize = 8;
const OPS_PER_THREAD: usize = 2_000;

#[test]
fn lru_survives_contention() {
    let cache = Arc::new(LruCache::new(64));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    let key = ((t * 31 + i * 7) % 128) as u64;
                    if i % 3 == 0 {
                        cache.put(key, key * 10);
                    } else if i % 3 == 1 {
                        if let Some(value) = cache.get(&key) {
                            assert_eq!(value, key * 10);
                        }
                    } else {
                        cache.remove(&key);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(cache.len() <= 64);
    assert!(cache.check_invariants().is_ok());
}

#[test]
fn lfu_survives_contention_with_aging() {
    // A tight aging threshold makes the O(n) aging pass fire repeatedly
    // under load.
    let cache = Arc::new(LfuCache::try_with_max_average_freq(32, 2).unwrap());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    let key = ((t + i * 13) % 48) as u64;
                    if i % 2 == 0 {
                        cache.put(key, key);
                    } else {
                        let _ = cache.get(&key);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(cache.len() <= 32);
    assert!(cache.check_invariants().is_ok());
}

#[test]
fn arc_halves_stay_consistent_under_contention() {
    let cache = Arc::new(ArcCache::new(32));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    let key = ((t * 17 + i) % 64) as u64;
                    if i % 2 == 0 {
                        cache.put(key, key);
                    } else {
                        let _ = cache.get(&key);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Once the writers are quiescent, each half obeys its invariants and
    // the capacity split sums to the configured total.
    assert_eq!(cache.lru_capacity() + cache.lfu_capacity(), 32);
    assert!(cache.check_invariants().is_ok());
}

#[test]
fn sharded_cache_scales_across_threads() {
    let cache = Arc::new(ShardedCache::lru(256, 8));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    let key = ((t * 1009 + i) % 512) as u64;
                    if i % 2 == 0 {
                        cache.put(key, key + 1);
                    } else if let Some(value) = cache.get(&key) {
                        assert_eq!(value, key + 1);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    for shard in cache.shards() {
        assert!(shard.len() <= shard.capacity());
        assert!(shard.check_invariants().is_ok());
    }
}

#[test]
fn same_key_routes_to_same_shard_from_any_thread() {
    let cache = Arc::new(ShardedCache::<u64, u64, _>::lru(64, 4));
    let expected: Vec<usize> = (0u64..32).map(|k| cache.shard_index(&k)).collect();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let expected = expected.clone();
            thread::spawn(move || {
                for (key, &shard) in expected.iter().enumerate() {
                    assert_eq!(cache.shard_index(&(key as u64)), shard);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
