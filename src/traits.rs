//! # Cache Policy Contract
//!
//! The single trait every eviction engine and wrapper implements. Callers
//! program against [`CachePolicy`] and pick the policy at construction time:
//!
//! ```text
//!                      ┌──────────────────────────────────┐
//!                      │        CachePolicy<K, V>         │
//!                      │                                  │
//!                      │  put(&self, K, V)                │
//!                      │  get(&self, &K) → Option<V>      │
//!                      │  get_or_default(&self, &K) → V   │
//!                      └───────────────┬──────────────────┘
//!                                      │
//!          ┌──────────┬────────────────┼────────────────┬───────────────┐
//!          ▼          ▼                ▼                ▼               ▼
//!     LruCache    LfuCache        ArcCache         LruKCache     ShardedCache
//!     (recency)  (frequency)  (adaptive halves)  (K-promotion)   (fan-out)
//! ```
//!
//! ## Receiver and locking
//!
//! Methods take `&self`: every implementation carries its own mutex and may
//! be called concurrently from any number of threads. The adaptive cache's
//! two halves are locked independently, so a sequence of calls against it is
//! not atomic across the halves — each half individually stays consistent.
//!
//! ## Miss reporting
//!
//! `get` is the miss-distinguishing form and returns `Option<V>`. The
//! convenience form `get_or_default` swallows misses by materializing
//! `V::default()`; use it only when a default value is genuinely
//! indistinguishable from "absent" for your value type.

/// Uniform interface over the eviction policies in this crate.
///
/// # Example
///
/// ```
/// use evictkit::policy::lru::LruCache;
/// use evictkit::policy::lfu::LfuCache;
/// use evictkit::traits::CachePolicy;
///
/// fn warm<C: CachePolicy<u64, String>>(cache: &C) {
///     for i in 0..4 {
///         cache.put(i, format!("value {i}"));
///     }
/// }
///
/// let lru = LruCache::new(8);
/// let lfu = LfuCache::new(8);
/// warm(&lru);
/// warm(&lfu);
/// assert_eq!(lru.get(&1).as_deref(), Some("value 1"));
/// assert_eq!(lfu.get(&1).as_deref(), Some("value 1"));
/// ```
pub trait CachePolicy<K, V> {
    /// Inserts or overwrites `key`, evicting per the policy when full.
    ///
    /// A cache configured with capacity 0 silently drops every `put`.
    fn put(&self, key: K, value: V);

    /// Looks up `key`, counting the access for the policy's bookkeeping.
    ///
    /// Returns `None` on a miss.
    fn get(&self, key: &K) -> Option<V>;

    /// Like [`get`](Self::get), but returns `V::default()` on a miss.
    ///
    /// # Example
    ///
    /// ```
    /// use evictkit::policy::lru::LruCache;
    /// use evictkit::traits::CachePolicy;
    ///
    /// let cache: LruCache<u32, String> = LruCache::new(4);
    /// cache.put(1, "hit".to_string());
    ///
    /// assert_eq!(cache.get_or_default(&1), "hit");
    /// assert_eq!(cache.get_or_default(&2), "");
    /// ```
    fn get_or_default(&self, key: &K) -> V
    where
        V: Default,
    {
        self.get(key).unwrap_or_default()
    }
}
