//! Frequency-ordered entry map for LFU-style engines.
//!
//! Entries carry a key, a value, and a frequency counter. Each frequency has
//! a doubly linked chain of entries threaded through a shared slot arena;
//! the chains live in a vector indexed by `frequency - 1`, which keeps the
//! bucket lookup a plain array access. Within a chain, newly promoted
//! entries are appended at the tail, so the chain head is the entry that has
//! sat at that frequency the longest — the eviction victim for that class.
//!
//! `min_freq` names the lowest frequency with a non-empty chain (0 when the
//! structure is empty), and `total_freq` is the running sum of live
//! frequencies, which callers use to drive aging decisions. `age_all`
//! lowers every frequency by a fixed delta (clamping at 1), re-buckets the
//! entries without disturbing intra-chain order, and recomputes both
//! trackers.

use rustc_hash::FxHashMap;
use std::hash::Hash;

const NIL: u32 = u32::MAX;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    freq: u64,
    prev: u32,
    next: u32,
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    head: u32,
    tail: u32,
}

impl Bucket {
    const EMPTY: Bucket = Bucket {
        head: NIL,
        tail: NIL,
    };

    fn is_empty(self) -> bool {
        self.head == NIL
    }
}

/// Map from key to (value, frequency) with O(1) min-frequency eviction.
#[derive(Debug)]
pub struct FrequencyBuckets<K, V> {
    entries: Vec<Option<Entry<K, V>>>,
    free: Vec<u32>,
    index: FxHashMap<K, u32>,
    /// `buckets[f - 1]` chains the entries at frequency `f`.
    buckets: Vec<Bucket>,
    min_freq: u64,
    total_freq: u64,
}

impl<K, V> FrequencyBuckets<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
            index: FxHashMap::default(),
            buckets: Vec::new(),
            min_freq: 0,
            total_freq: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            free: Vec::new(),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            buckets: Vec::new(),
            min_freq: 0,
            total_freq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Lowest frequency with at least one entry, or `None` when empty.
    pub fn min_freq(&self) -> Option<u64> {
        if self.min_freq == 0 {
            None
        } else {
            Some(self.min_freq)
        }
    }

    /// Sum of all live frequencies.
    pub fn total_freq(&self) -> u64 {
        self.total_freq
    }

    pub fn frequency(&self, key: &K) -> Option<u64> {
        let idx = *self.index.get(key)?;
        Some(self.entry(idx).freq)
    }

    pub fn get_value(&self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        Some(&self.entry(idx).value)
    }

    /// Swaps in a new value without touching the frequency; returns the old
    /// value if the key was present.
    pub fn replace_value(&mut self, key: &K, value: V) -> Option<V> {
        let idx = *self.index.get(key)?;
        Some(std::mem::replace(&mut self.entry_mut(idx).value, value))
    }

    /// Iterates live keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.index.keys()
    }

    /// Inserts `key` at frequency 1; returns `false` if already present.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        let idx = self.alloc(Entry {
            key: key.clone(),
            value,
            freq: 1,
            prev: NIL,
            next: NIL,
        });
        self.chain_push_tail(1, idx);
        self.index.insert(key, idx);
        self.total_freq += 1;
        if self.min_freq == 0 || self.min_freq > 1 {
            self.min_freq = 1;
        }
        true
    }

    /// Counts one access: moves the entry from bucket `f` to bucket `f + 1`
    /// and returns the new frequency.
    pub fn touch(&mut self, key: &K) -> Option<u64> {
        let idx = *self.index.get(key)?;
        let old = self.entry(idx).freq;
        let new = old + 1;

        self.chain_unlink(old, idx);
        self.entry_mut(idx).freq = new;
        self.chain_push_tail(new, idx);
        self.total_freq += 1;

        if self.min_freq == old && self.bucket(old).is_empty() {
            // The touched entry is now the sole occupant of the next bucket
            // or joins an existing one; either way `f + 1` is populated.
            self.min_freq = new;
        }
        Some(new)
    }

    /// Removes `key`, returning its value and final frequency.
    pub fn remove(&mut self, key: &K) -> Option<(V, u64)> {
        let idx = self.index.remove(key)?;
        let freq = self.entry(idx).freq;
        self.chain_unlink(freq, idx);
        let entry = self.release(idx);
        self.total_freq -= freq;
        self.advance_min_from(freq);
        Some((entry.value, entry.freq))
    }

    /// Evicts the head of the min-frequency chain: the least frequent entry,
    /// and among ties the one promoted into that frequency the longest ago.
    pub fn pop_min(&mut self) -> Option<(K, V, u64)> {
        if self.min_freq == 0 {
            return None;
        }
        let freq = self.min_freq;
        let idx = self.bucket(freq).head;
        debug_assert_ne!(idx, NIL, "min_freq bucket is empty");
        self.chain_unlink(freq, idx);
        let entry = self.release(idx);
        self.index.remove(&entry.key);
        self.total_freq -= freq;
        self.advance_min_from(freq);
        Some((entry.key, entry.value, entry.freq))
    }

    /// Returns the current eviction victim without removing it.
    pub fn peek_min(&self) -> Option<(&K, u64)> {
        if self.min_freq == 0 {
            return None;
        }
        let idx = self.bucket(self.min_freq).head;
        let entry = self.entries.get(idx as usize)?.as_ref()?;
        Some((&entry.key, entry.freq))
    }

    /// Lowers every frequency by `delta` (clamped at 1), re-buckets all
    /// entries, and recomputes `min_freq` and `total_freq`.
    ///
    /// Entries are re-appended lowest frequency first, preserving each
    /// chain's relative order, so eviction ties stay stable across an aging
    /// pass. O(n).
    pub fn age_all(&mut self, delta: u64) {
        if delta == 0 || self.index.is_empty() {
            return;
        }

        let mut order = Vec::with_capacity(self.index.len());
        for bucket in &self.buckets {
            let mut current = bucket.head;
            while current != NIL {
                order.push(current);
                current = self.entry(current).next;
            }
        }

        for bucket in &mut self.buckets {
            *bucket = Bucket::EMPTY;
        }
        self.total_freq = 0;
        let mut min = u64::MAX;

        for idx in order {
            let new_freq = {
                let entry = self.entry_mut(idx);
                entry.freq = entry.freq.saturating_sub(delta).max(1);
                entry.freq
            };
            self.chain_push_tail(new_freq, idx);
            self.total_freq += new_freq;
            min = min.min(new_freq);
        }
        self.min_freq = min;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.free.clear();
        self.index.clear();
        self.buckets.clear();
        self.min_freq = 0;
        self.total_freq = 0;
    }

    fn entry(&self, idx: u32) -> &Entry<K, V> {
        self.entries[idx as usize]
            .as_ref()
            .expect("frequency entry missing")
    }

    fn entry_mut(&mut self, idx: u32) -> &mut Entry<K, V> {
        self.entries[idx as usize]
            .as_mut()
            .expect("frequency entry missing")
    }

    fn alloc(&mut self, entry: Entry<K, V>) -> u32 {
        if let Some(idx) = self.free.pop() {
            self.entries[idx as usize] = Some(entry);
            idx
        } else {
            self.entries.push(Some(entry));
            (self.entries.len() - 1) as u32
        }
    }

    fn release(&mut self, idx: u32) -> Entry<K, V> {
        let entry = self.entries[idx as usize]
            .take()
            .expect("frequency entry missing");
        self.free.push(idx);
        entry
    }

    fn bucket(&self, freq: u64) -> Bucket {
        let slot = (freq - 1) as usize;
        self.buckets.get(slot).copied().unwrap_or(Bucket::EMPTY)
    }

    fn ensure_bucket(&mut self, freq: u64) -> usize {
        let slot = (freq - 1) as usize;
        while self.buckets.len() <= slot {
            self.buckets.push(Bucket::EMPTY);
        }
        slot
    }

    fn chain_push_tail(&mut self, freq: u64, idx: u32) {
        let slot = self.ensure_bucket(freq);
        let mut bucket = self.buckets[slot];
        let tail = bucket.tail;
        {
            let entry = self.entry_mut(idx);
            entry.prev = tail;
            entry.next = NIL;
        }
        if tail != NIL {
            self.entry_mut(tail).next = idx;
        } else {
            bucket.head = idx;
        }
        bucket.tail = idx;
        self.buckets[slot] = bucket;
    }

    fn chain_unlink(&mut self, freq: u64, idx: u32) {
        let slot = (freq - 1) as usize;
        let mut bucket = self.buckets[slot];
        let (prev, next) = {
            let entry = self.entry(idx);
            (entry.prev, entry.next)
        };
        if prev != NIL {
            self.entry_mut(prev).next = next;
        } else {
            bucket.head = next;
        }
        if next != NIL {
            self.entry_mut(next).prev = prev;
        } else {
            bucket.tail = prev;
        }
        {
            let entry = self.entry_mut(idx);
            entry.prev = NIL;
            entry.next = NIL;
        }
        self.buckets[slot] = bucket;
    }

    /// If the bucket at `freq` just emptied and was the minimum, scans
    /// upward for the next populated bucket (0 when none remain).
    fn advance_min_from(&mut self, freq: u64) {
        if self.min_freq != freq || !self.bucket(freq).is_empty() {
            return;
        }
        let start = (freq - 1) as usize + 1;
        for slot in start..self.buckets.len() {
            if !self.buckets[slot].is_empty() {
                self.min_freq = (slot + 1) as u64;
                return;
            }
        }
        self.min_freq = 0;
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let live = self.entries.iter().filter(|e| e.is_some()).count();
        assert_eq!(live, self.index.len());

        let mut seen = 0usize;
        let mut total = 0u64;
        let mut observed_min = 0u64;
        for (slot, bucket) in self.buckets.iter().enumerate() {
            let freq = (slot + 1) as u64;
            let mut current = bucket.head;
            let mut last = NIL;
            while current != NIL {
                let entry = self.entry(current);
                assert_eq!(entry.freq, freq, "entry sits in the wrong bucket");
                assert_eq!(entry.prev, last);
                assert_eq!(self.index.get(&entry.key), Some(&current));
                total += entry.freq;
                seen += 1;
                last = current;
                current = entry.next;
            }
            assert_eq!(bucket.tail, last);
            if observed_min == 0 && bucket.head != NIL {
                observed_min = freq;
            }
        }
        assert_eq!(seen, self.index.len());
        assert_eq!(total, self.total_freq);
        assert_eq!(observed_min, self.min_freq);
    }
}

impl<K, V> Default for FrequencyBuckets<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
