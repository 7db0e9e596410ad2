//! # LFU (Least Frequently Used) Cache
//!
//! A fixed-capacity cache that, when full, evicts the entry with the fewest
//! recorded accesses, breaking ties by evicting the one touched longest ago.
//! Every operation is O(1).
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                            LfuCache<K, V>                                │
//!   │                                                                          │
//!   │   index: FxHashMap<K, EntryHandle>      entries: EntryArena<Entry<K, V>> │
//!   │   ┌──────┬────────┐                     ┌────────┬──────────────────────┐ │
//!   │   │ 17   │  h0    │────────────────────►│ h0     │ freq 3, value, links │ │
//!   │   │ 4    │  h1    │────────────────────►│ h1     │ freq 1, value, links │ │
//!   │   │ 9    │  h2    │────────────────────►│ h2     │ freq 1, value, links │ │
//!   │   └──────┴────────┘                     └────────┴──────────────────────┘ │
//!   │                                                                          │
//!   │   buckets: FxHashMap<u64, FrequencyBucket>                               │
//!   │                                                                          │
//!   │     min_freq = 1                                                         │
//!   │        │                                                                 │
//!   │        ▼                                                                 │
//!   │     freq=1: head ─► [h2] ◄─► [h1] ◄─ tail     next_freq = 3              │
//!   │                      MRU      LRU (victim)                               │
//!   │     freq=3: head ─► [h0] ◄─ tail              prev_freq = 1              │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The arena owns each entry; the index and the bucket lists only hold
//! handles into it. Buckets link to their occupied neighbour frequencies, so
//! when the minimum bucket empties the new minimum is one pointer away.
//!
//! ## Operations
//!
//! | Method          | Effect                                                     |
//! |-----------------|------------------------------------------------------------|
//! | `get(&k)`       | hit: frequency + 1, move to head of next bucket, copy out  |
//! | `put(k, v)`     | existing: overwrite + promote; new: evict if full, freq 1  |
//! | `remove(&k)`    | unlink and drop; empty bucket is detached                  |
//! | `clear()`       | drop everything                                            |
//! | `peek_victim()` | entry the next eviction would remove                       |
//!
//! ## Frequency Lifecycle
//!
//! ```text
//!   put(new key) ──► freq 1 ──get / put──► freq 2 ──get / put──► ... ──► u64::MAX (sticky)
//!                      │                                                     │
//!                      └───────────── remove / clear / eviction ─────────────┘
//! ```
//!
//! A frequency never decreases while the key stays resident. Overwriting an
//! existing key with `put` counts as an access.
//!
//! ## Thread Safety
//!
//! `LfuCache` performs no synchronization. Share it through
//! [`SharedLfuCache`](crate::sync::SharedLfuCache), which holds one lock per
//! shard around the whole engine.
//!
//! ## Example Usage
//!
//! ```
//! use expensekit::policy::lfu::LfuCache;
//!
//! let mut cache = LfuCache::new(2);
//! cache.put(1, "a");
//! cache.put(2, "b");
//! assert_eq!(cache.get(&1), Some("a")); // key 1 now at frequency 2
//!
//! cache.put(3, "c"); // evicts key 2 (frequency 1)
//! assert!(!cache.contains(&2));
//! assert!(cache.contains(&1) && cache.contains(&3));
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::ds::arena::{EntryArena, EntryHandle};
use crate::ds::frequency_bucket::{Entry, FrequencyBucket};
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LfuMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LfuMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{LfuMetricsRecorder, MetricsSnapshotProvider};
use crate::traits::CoreCache;

/// Identifier of a persisted entity; the key type of the entity caches.
pub type EntityId = i64;

/// Upper bound on up-front allocation, so a huge configured capacity does
/// not reserve memory that may never be used.
const MAX_PREALLOC: usize = 4096;

/// Fixed-capacity LFU cache with LRU tie-breaking.
///
/// See the module documentation for layout and complexity.
#[derive(Debug)]
pub struct LfuCache<K, V> {
    capacity: usize,
    entries: EntryArena<Entry<K, V>>,
    index: FxHashMap<K, EntryHandle>,
    buckets: FxHashMap<u64, FrequencyBucket>,
    // 0 when empty
    min_freq: u64,
    #[cfg(feature = "metrics")]
    metrics: LfuMetrics,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// A capacity of zero yields a cache that stores nothing.
    pub fn new(capacity: usize) -> Self {
        let prealloc = capacity.min(MAX_PREALLOC);
        debug!(capacity, "creating lfu cache");
        Self {
            capacity,
            entries: EntryArena::with_capacity(prealloc),
            index: FxHashMap::with_capacity_and_hasher(prealloc, Default::default()),
            buckets: FxHashMap::default(),
            min_freq: 0,
            #[cfg(feature = "metrics")]
            metrics: LfuMetrics::default(),
        }
    }

    /// Creates a cache from a signed capacity, as read from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is negative or does not fit in
    /// `usize`.
    pub fn try_new(capacity: i64) -> Result<Self, ConfigError> {
        let capacity = usize::try_from(capacity).map_err(|_| {
            ConfigError::new(format!("capacity must be >= 0, got {capacity}"))
        })?;
        Ok(Self::new(capacity))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns `true` if `key` is resident. Does not count as an access.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Current access count of `key`, if resident.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        let handle = *self.index.get(key)?;
        self.entries.get(handle).map(Entry::frequency)
    }

    /// Smallest frequency among resident entries.
    pub fn min_frequency(&self) -> Option<u64> {
        (self.min_freq != 0).then_some(self.min_freq)
    }

    /// The entry the next eviction would remove, without touching it.
    pub fn peek_victim(&self) -> Option<(&K, &V)> {
        let handle = self.buckets.get(&self.min_freq)?.tail()?;
        let entry = self.entries.get(handle)?;
        Some((&entry.key, &entry.value))
    }

    /// Returns a copy of the value for `key`, promoting it one frequency.
    pub fn get(&mut self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let Some(&handle) = self.index.get(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };

        self.promote(handle);
        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        Some(self.entry(handle).value.clone())
    }

    /// Inserts or overwrites `key`.
    ///
    /// Overwriting promotes the entry exactly like a hit. Inserting a new key
    /// into a full cache first evicts the least frequently used entry (oldest
    /// touch among ties). With capacity zero nothing is stored.
    pub fn put(&mut self, key: K, value: V) {
        if let Some(&handle) = self.index.get(&key) {
            self.entry_mut(handle).value = value;
            self.promote(handle);
            #[cfg(feature = "metrics")]
            self.metrics.record_put_update();
            return;
        }

        if self.capacity == 0 {
            #[cfg(feature = "metrics")]
            self.metrics.record_put_rejected();
            return;
        }

        if self.index.len() >= self.capacity {
            self.evict();
        }

        let handle = self.entries.insert(Entry::new(key.clone(), value));
        self.index.insert(key, handle);
        if !self.buckets.contains_key(&1) {
            let next = self.min_frequency();
            self.attach_bucket(1, None, next);
        }
        self.buckets
            .get_mut(&1)
            .expect("frequency-1 bucket missing after attach")
            .push_front(&mut self.entries, handle);
        debug_assert_eq!(self.min_freq, 1);

        #[cfg(feature = "metrics")]
        self.metrics.record_put_new();
    }

    /// Removes `key`, returning its value if it was resident.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let Some(handle) = self.index.remove(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_remove_miss();
            return None;
        };

        let freq = self.entry(handle).freq;
        let bucket = self
            .buckets
            .get_mut(&freq)
            .expect("resident entry has no bucket");
        bucket.unlink(&mut self.entries, handle);
        if bucket.is_empty() {
            self.detach_bucket(freq);
        }

        let entry = self
            .entries
            .remove(handle)
            .expect("indexed entry missing from arena");
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_hit();
        Some(entry.value)
    }

    /// Drops every entry. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.buckets.clear();
        self.min_freq = 0;
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
        debug!(capacity = self.capacity, "lfu cache cleared");
    }

    /// Resident keys in the order they would be evicted.
    ///
    /// Walks buckets from the minimum frequency upward, tail to head within
    /// each bucket. O(n); meant for diagnostics and tests.
    pub fn keys_by_eviction_order(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.len());
        let mut freq = self.min_frequency();
        while let Some(f) = freq {
            let bucket = &self.buckets[&f];
            let start = keys.len();
            keys.extend(bucket.iter(&self.entries).map(|(_, e)| e.key.clone()));
            keys[start..].reverse();
            freq = bucket.next_freq();
        }
        keys
    }

    /// Verifies every structural invariant of the index, buckets and
    /// `min_freq`, reporting the first one that fails.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        fn fail(msg: String) -> Result<(), InvariantError> {
            Err(InvariantError::new(msg))
        }

        if self.len() > self.capacity {
            return fail(format!("len {} exceeds capacity {}", self.len(), self.capacity));
        }
        if self.entries.len() != self.index.len() {
            return fail(format!(
                "arena holds {} entries but index holds {}",
                self.entries.len(),
                self.index.len()
            ));
        }
        if self.index.is_empty() {
            if !self.buckets.is_empty() {
                return fail(format!("empty cache still has {} buckets", self.buckets.len()));
            }
            if self.min_freq != 0 {
                return fail(format!("empty cache has min_freq {}", self.min_freq));
            }
            return Ok(());
        }

        match self.buckets.get(&self.min_freq) {
            None => return fail(format!("min_freq {} has no bucket", self.min_freq)),
            Some(bucket) if bucket.prev_freq().is_some() => {
                return fail(format!("min_freq bucket {} has a lower neighbour", self.min_freq));
            },
            Some(_) => {},
        }

        let mut total = 0usize;
        for (&freq, bucket) in &self.buckets {
            if freq < self.min_freq {
                return fail(format!("bucket {freq} is below min_freq {}", self.min_freq));
            }
            if bucket.is_empty() {
                return fail(format!("bucket {freq} is empty"));
            }
            match bucket.prev_freq() {
                Some(p) => match self.buckets.get(&p) {
                    Some(prev) if p < freq && prev.next_freq() == Some(freq) => {},
                    _ => return fail(format!("bucket {freq} has broken prev link {p}")),
                },
                None if freq != self.min_freq => {
                    return fail(format!("bucket {freq} has no prev but is not min_freq"));
                },
                None => {},
            }
            if let Some(n) = bucket.next_freq() {
                match self.buckets.get(&n) {
                    Some(next) if n > freq && next.prev_freq() == Some(freq) => {},
                    _ => return fail(format!("bucket {freq} has broken next link {n}")),
                }
            }

            let mut last = None;
            let mut count = 0usize;
            for (handle, entry) in bucket.iter(&self.entries) {
                count += 1;
                if count > bucket.len() {
                    return fail(format!("bucket {freq} is longer than its recorded len"));
                }
                if entry.freq != freq {
                    return fail(format!("entry with freq {} sits in bucket {freq}", entry.freq));
                }
                if entry.prev != last {
                    return fail(format!("bucket {freq} has a broken back link"));
                }
                if self.index.get(&entry.key) != Some(&handle) {
                    return fail(format!("bucket {freq} holds an entry the index does not map"));
                }
                last = Some(handle);
            }
            if count != bucket.len() {
                return fail(format!(
                    "bucket {freq} walks {count} entries but records {}",
                    bucket.len()
                ));
            }
            if bucket.tail() != last {
                return fail(format!("bucket {freq} tail does not match its last entry"));
            }
            total += count;
        }

        if total != self.index.len() {
            return fail(format!(
                "buckets hold {total} entries but index holds {}",
                self.index.len()
            ));
        }
        Ok(())
    }

    /// Panics on the first violated invariant.
    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("lfu cache invariant violated: {err}");
        }
    }

    fn entry(&self, handle: EntryHandle) -> &Entry<K, V> {
        self.entries
            .get(handle)
            .expect("indexed entry missing from arena")
    }

    fn entry_mut(&mut self, handle: EntryHandle) -> &mut Entry<K, V> {
        self.entries
            .get_mut(handle)
            .expect("indexed entry missing from arena")
    }

    /// Moves `handle` to the head of the next-higher frequency bucket.
    fn promote(&mut self, handle: EntryHandle) {
        let old_freq = self.entry(handle).freq;
        let bucket = self
            .buckets
            .get_mut(&old_freq)
            .expect("resident entry has no bucket");
        bucket.unlink(&mut self.entries, handle);

        if old_freq == u64::MAX {
            // saturated: refresh recency only
            bucket.push_front(&mut self.entries, handle);
            return;
        }

        let new_freq = old_freq + 1;
        let (prev, next, emptied) = (bucket.prev_freq(), bucket.next_freq(), bucket.is_empty());
        if emptied {
            self.detach_bucket(old_freq);
        }

        self.entry_mut(handle).freq = new_freq;
        if !self.buckets.contains_key(&new_freq) {
            let prev = if emptied { prev } else { Some(old_freq) };
            self.attach_bucket(new_freq, prev, next);
        }
        self.buckets
            .get_mut(&new_freq)
            .expect("promotion target bucket missing")
            .push_front(&mut self.entries, handle);
    }

    /// Evicts the tail of the minimum-frequency bucket.
    fn evict(&mut self) -> Option<(K, V)> {
        let freq = self.min_frequency()?;
        let bucket = self
            .buckets
            .get_mut(&freq)
            .expect("min_freq bucket missing");
        let handle = bucket
            .pop_back(&mut self.entries)
            .expect("min_freq bucket is empty");
        if bucket.is_empty() {
            self.detach_bucket(freq);
        }

        let entry = self
            .entries
            .remove(handle)
            .expect("evicted entry missing from arena");
        self.index.remove(&entry.key);
        #[cfg(feature = "metrics")]
        self.metrics.record_evicted_entry();
        trace!(frequency = entry.freq, len = self.index.len(), "evicted lfu entry");
        Some((entry.key, entry.value))
    }

    /// Inserts an empty bucket between two occupied neighbours.
    fn attach_bucket(&mut self, freq: u64, prev: Option<u64>, next: Option<u64>) {
        self.buckets.insert(freq, FrequencyBucket::new(prev, next));
        if let Some(p) = prev {
            self.buckets
                .get_mut(&p)
                .expect("prev bucket missing")
                .next_freq = Some(freq);
        }
        if let Some(n) = next {
            self.buckets
                .get_mut(&n)
                .expect("next bucket missing")
                .prev_freq = Some(freq);
        }
        if self.min_freq == 0 || freq < self.min_freq {
            self.min_freq = freq;
        }
    }

    /// Removes an emptied bucket and splices its neighbours together.
    fn detach_bucket(&mut self, freq: u64) {
        let bucket = self
            .buckets
            .remove(&freq)
            .expect("detaching a missing bucket");
        debug_assert!(bucket.is_empty(), "detaching a non-empty bucket");

        if let Some(p) = bucket.prev_freq() {
            self.buckets
                .get_mut(&p)
                .expect("prev bucket missing")
                .next_freq = bucket.next_freq();
        }
        if let Some(n) = bucket.next_freq() {
            self.buckets
                .get_mut(&n)
                .expect("next bucket missing")
                .prev_freq = bucket.prev_freq();
        }
        if self.min_freq == freq {
            self.min_freq = bucket.next_freq().unwrap_or(0);
        }
    }
}

impl<K, V> CoreCache<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn get(&mut self, key: &K) -> Option<V> {
        LfuCache::get(self, key)
    }

    fn put(&mut self, key: K, value: V) {
        LfuCache::put(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        LfuCache::remove(self, key)
    }

    fn clear(&mut self) {
        LfuCache::clear(self)
    }

    fn contains(&self, key: &K) -> bool {
        LfuCache::contains(self, key)
    }

    fn len(&self) -> usize {
        LfuCache::len(self)
    }

    fn capacity(&self) -> usize {
        LfuCache::capacity(self)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> LfuMetricsSnapshot {
        let m = &self.metrics;
        LfuMetricsSnapshot {
            get_calls: m.get_calls,
            get_hits: m.get_hits,
            get_misses: m.get_misses,
            put_calls: m.put_calls,
            put_new: m.put_new,
            put_updates: m.put_updates,
            put_rejected: m.put_rejected,
            evicted_entries: m.evicted_entries,
            remove_calls: m.remove_calls,
            remove_hits: m.remove_hits,
            clear_calls: m.clear_calls,
            cache_len: self.len(),
            capacity: self.capacity,
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LfuMetricsSnapshot> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> LfuMetricsSnapshot {
        self.metrics_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resident(cache: &LfuCache<i64, &'static str>) -> Vec<i64> {
        let mut keys = cache.keys_by_eviction_order();
        keys.sort_unstable();
        keys
    }

    mod scenarios {
        use super::*;

        #[test]
        fn accessed_key_survives_eviction() {
            let mut cache = LfuCache::new(2);
            cache.put(1, "a");
            cache.put(2, "b");
            assert_eq!(cache.get(&1), Some("a"));
            assert_eq!(cache.frequency(&1), Some(2));

            cache.put(3, "c");
            assert_eq!(resident(&cache), vec![1, 3]);
            assert_eq!(cache.get(&2), None);
            cache.debug_validate_invariants();
        }

        #[test]
        fn ties_evict_least_recently_touched() {
            let mut cache = LfuCache::new(2);
            cache.put(1, "a");
            cache.put(2, "b");
            cache.put(3, "c");
            assert_eq!(resident(&cache), vec![2, 3]);
            cache.debug_validate_invariants();
        }

        #[test]
        fn zero_capacity_stores_nothing() {
            let mut cache = LfuCache::new(0);
            cache.put(1, "a");
            assert_eq!(cache.get(&1), None);
            assert_eq!(cache.len(), 0);
            assert_eq!(cache.min_frequency(), None);
            cache.debug_validate_invariants();
        }

        #[test]
        fn overwrite_counts_as_access() {
            let mut cache = LfuCache::new(4);
            cache.put(1, "a");
            cache.put(1, "b");
            assert_eq!(cache.frequency(&1), Some(2));
            assert_eq!(cache.get(&1), Some("b"));
            assert_eq!(cache.frequency(&1), Some(3));
            assert_eq!(cache.len(), 1);
            cache.debug_validate_invariants();
        }
    }

    mod basic_behavior {
        use super::*;

        #[test]
        fn miss_does_not_mutate() {
            let mut cache = LfuCache::new(3);
            cache.put(1, "a");
            assert_eq!(cache.get(&42), None);
            assert_eq!(cache.frequency(&1), Some(1));
            assert_eq!(cache.len(), 1);
        }

        #[test]
        fn try_new_rejects_negative_capacity() {
            assert!(LfuCache::<i64, u8>::try_new(-1).is_err());
            assert_eq!(LfuCache::<i64, u8>::try_new(0).unwrap().capacity(), 0);
            assert_eq!(LfuCache::<i64, u8>::try_new(100).unwrap().capacity(), 100);
        }

        #[test]
        fn remove_returns_value_and_is_idempotent() {
            let mut cache = LfuCache::new(3);
            cache.put(1, "a");
            cache.put(2, "b");
            assert_eq!(cache.remove(&1), Some("a"));
            assert_eq!(cache.remove(&1), None);
            assert_eq!(cache.get(&1), None);
            assert_eq!(cache.len(), 1);
            cache.debug_validate_invariants();
        }

        #[test]
        fn clear_resets_everything() {
            let mut cache = LfuCache::new(3);
            cache.put(1, "a");
            cache.put(2, "b");
            cache.get(&1);
            cache.clear();
            assert!(cache.is_empty());
            assert_eq!(cache.get(&1), None);
            assert_eq!(cache.get(&2), None);
            assert_eq!(cache.min_frequency(), None);
            assert_eq!(cache.peek_victim(), None);
            assert_eq!(cache.capacity(), 3);
            cache.debug_validate_invariants();

            cache.put(5, "e");
            assert_eq!(cache.frequency(&5), Some(1));
        }

        #[test]
        fn reinserted_key_restarts_at_one() {
            let mut cache = LfuCache::new(3);
            cache.put(1, "a");
            cache.get(&1);
            cache.get(&1);
            assert_eq!(cache.frequency(&1), Some(3));
            cache.remove(&1);
            cache.put(1, "a");
            assert_eq!(cache.frequency(&1), Some(1));
        }

        #[test]
        fn capacity_never_exceeded() {
            let mut cache = LfuCache::new(5);
            for i in 0..100 {
                cache.put(i, "v");
                assert!(cache.len() <= 5);
            }
            assert_eq!(cache.len(), 5);
            cache.debug_validate_invariants();
        }
    }

    mod frequency_tracking {
        use super::*;

        #[test]
        fn min_frequency_follows_removals() {
            let mut cache = LfuCache::new(4);
            cache.put(1, "a");
            cache.put(2, "b");
            cache.get(&2);
            cache.get(&2);
            assert_eq!(cache.min_frequency(), Some(1));

            cache.remove(&1);
            assert_eq!(cache.min_frequency(), Some(3));
            assert_eq!(cache.peek_victim(), Some((&2, &"b")));
            cache.debug_validate_invariants();
        }

        #[test]
        fn min_frequency_skips_gaps_on_promotion() {
            let mut cache = LfuCache::new(4);
            cache.put(1, "a");
            cache.put(2, "b");
            for _ in 0..4 {
                cache.get(&2);
            }
            // buckets: 1 -> {1}, 5 -> {2}
            cache.get(&1);
            assert_eq!(cache.min_frequency(), Some(2));
            cache.get(&1);
            cache.get(&1);
            cache.get(&1);
            // both at 5 now; key 1 touched last
            assert_eq!(cache.frequency(&1), Some(5));
            assert_eq!(cache.min_frequency(), Some(5));
            assert_eq!(cache.keys_by_eviction_order(), vec![2, 1]);
            cache.debug_validate_invariants();
        }

        #[test]
        fn eviction_order_lists_low_frequency_first() {
            let mut cache = LfuCache::new(5);
            for k in 1..=5 {
                cache.put(k, "v");
            }
            cache.get(&3);
            cache.get(&3);
            cache.get(&1);
            cache.get(&5);
            // freq 1: 2 (older), 4; freq 2: 1 (older), 5; freq 3: 3
            assert_eq!(cache.keys_by_eviction_order(), vec![2, 4, 1, 5, 3]);
            assert_eq!(cache.peek_victim().map(|(k, _)| *k), Some(2));

            cache.put(6, "v");
            assert!(!cache.contains(&2));
            cache.put(7, "v");
            // 6 entered bucket 1 after 4
            assert!(!cache.contains(&4));
            assert!(cache.contains(&6));
            cache.debug_validate_invariants();
        }

        #[test]
        fn saturated_frequency_stays_put() {
            let mut cache = LfuCache::new(2);
            cache.put(1, "a");
            let handle = cache.index[&1];
            cache
                .buckets
                .get_mut(&1)
                .unwrap()
                .unlink(&mut cache.entries, handle);
            cache.detach_bucket(1);
            cache.entries.get_mut(handle).unwrap().freq = u64::MAX;
            cache.attach_bucket(u64::MAX, None, None);
            cache
                .buckets
                .get_mut(&u64::MAX)
                .unwrap()
                .push_front(&mut cache.entries, handle);
            cache.debug_validate_invariants();

            assert_eq!(cache.get(&1), Some("a"));
            assert_eq!(cache.frequency(&1), Some(u64::MAX));
            cache.put(2, "b");
            assert_eq!(cache.min_frequency(), Some(1));
            cache.debug_validate_invariants();
        }
    }

    mod invariants {
        use super::*;

        #[test]
        fn check_detects_corrupted_frequency() {
            let mut cache = LfuCache::new(3);
            cache.put(1, "a");
            cache.put(2, "b");
            assert!(cache.check_invariants().is_ok());

            let handle = cache.index[&2];
            cache.entries.get_mut(handle).unwrap().freq = 9;
            let err = cache.check_invariants().unwrap_err();
            assert!(err.message().contains("bucket 1"), "{err}");
        }

        #[test]
        fn check_detects_stale_min_freq() {
            let mut cache = LfuCache::new(3);
            cache.put(1, "a");
            cache.min_freq = 2;
            assert!(cache.check_invariants().is_err());
        }

        #[test]
        #[should_panic(expected = "lfu cache invariant violated")]
        fn debug_validate_panics_on_corruption() {
            let mut cache = LfuCache::new(3);
            cache.put(1, "a");
            cache.index.clear();
            cache.debug_validate_invariants();
        }
    }

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::*;

        #[test]
        fn snapshot_counts_operations() {
            let mut cache = LfuCache::new(1);
            cache.put(1, "a");
            cache.put(1, "b");
            cache.get(&1);
            cache.get(&2);
            cache.put(2, "c");
            cache.remove(&7);
            cache.remove(&2);

            let snap = cache.snapshot();
            assert_eq!(snap.put_calls, 3);
            assert_eq!(snap.put_new, 2);
            assert_eq!(snap.put_updates, 1);
            assert_eq!(snap.get_hits, 1);
            assert_eq!(snap.get_misses, 1);
            assert_eq!(snap.evicted_entries, 1);
            assert_eq!(snap.remove_calls, 2);
            assert_eq!(snap.remove_hits, 1);
            assert_eq!(snap.cache_len, 0);
            assert_eq!(snap.capacity, 1);
        }

        #[test]
        fn zero_capacity_put_is_counted_as_rejected() {
            let mut cache: LfuCache<i64, u8> = LfuCache::new(0);
            cache.put(1, 1);
            assert_eq!(cache.metrics_snapshot().put_rejected, 1);
        }
    }
}
