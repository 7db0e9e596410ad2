//! # Shared LFU Cache
//!
//! [`SharedLfuCache`] is the instance request workers hold. It wraps one or
//! more [`LfuCache`] shards, each behind its own `parking_lot::Mutex`, and is
//! cheap to clone (clones share the same shards).
//!
//! ```text
//!   SharedLfuCache<K, V>  (Clone = Arc clone)
//!   ┌─────────────────────────────────────────────────────────────┐
//!   │  selector: ShardSelector ── key ──► shard index             │
//!   │                                                             │
//!   │  shards[0]: Mutex<LfuCache>   capacity ⌈c / n⌉              │
//!   │  shards[1]: Mutex<LfuCache>   capacity ⌈c / n⌉ or ⌊c / n⌋   │
//!   │  ...                                                        │
//!   └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call locks exactly the shard its key routes to for the whole
//! operation, so a bucket migration is never observed half done. `get`
//! mutates frequency state, which is why shards use a `Mutex` rather than a
//! read/write lock.
//!
//! With the default single shard the cache is an exact LFU over all keys.
//! With `n > 1` shards eviction is LFU *within a shard*: a full shard evicts
//! its own least frequently used entry even if another shard holds a colder
//! one. Total capacity is still exactly the configured value.
//!
//! ## Example
//!
//! ```
//! use expensekit::sync::SharedLfuCache;
//! use expensekit::traits::ConcurrentCache;
//!
//! let cache: SharedLfuCache<i64, String> = SharedLfuCache::new(2);
//! let worker = cache.clone();
//! std::thread::spawn(move || worker.put(1, "groceries".to_string()))
//!     .join()
//!     .unwrap();
//! assert_eq!(cache.get(&1), Some("groceries".to_string()));
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::ds::ShardSelector;
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LfuMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::MetricsSnapshotProvider;
use crate::policy::lfu::LfuCache;
use crate::traits::ConcurrentCache;

struct Shards<K, V> {
    shards: Vec<Mutex<LfuCache<K, V>>>,
    selector: ShardSelector,
    capacity: usize,
}

/// Thread-safe, shardable LFU cache handle.
pub struct SharedLfuCache<K, V> {
    inner: Arc<Shards<K, V>>,
}

impl<K, V> Clone for SharedLfuCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> fmt::Debug for SharedLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedLfuCache")
            .field("shards", &self.inner.shards.len())
            .field("len", &self.len_inner())
            .field("capacity", &self.inner.capacity)
            .finish_non_exhaustive()
    }
}

impl<K, V> SharedLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a single-shard cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self::with_shards(capacity, 1, 0)
    }

    /// Creates a single-shard cache from a signed capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is negative.
    pub fn try_new(capacity: i64) -> Result<Self, ConfigError> {
        let capacity = usize::try_from(capacity).map_err(|_| {
            ConfigError::new(format!("capacity must be >= 0, got {capacity}"))
        })?;
        Ok(Self::new(capacity))
    }

    /// Creates a cache split over `shards` independently locked shards.
    ///
    /// `capacity` is divided as evenly as possible; the first
    /// `capacity % shards` shards get one extra slot. The shard count is
    /// clamped to `1..=capacity` so every shard holds at least one entry.
    pub fn with_shards(capacity: usize, shards: usize, seed: u64) -> Self {
        let selector = ShardSelector::new(shards.min(capacity).max(1), seed);
        let count = selector.shard_count();
        let (base, extra) = (capacity / count, capacity % count);
        let shards = (0..count)
            .map(|i| Mutex::new(LfuCache::new(base + usize::from(i < extra))))
            .collect();
        Self {
            inner: Arc::new(Shards {
                shards,
                selector,
                capacity,
            }),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.inner.shards.len()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Current access count of `key`, if resident. Does not count as an access.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.shard_for(key).lock().frequency(key)
    }

    /// Runs `f` with exclusive access to the shard that owns `key`.
    ///
    /// Lets a caller combine several engine calls atomically, e.g. a
    /// check-then-insert.
    pub fn with_shard<R>(&self, key: &K, f: impl FnOnce(&mut LfuCache<K, V>) -> R) -> R {
        let mut shard = self.shard_for(key).lock();
        f(&mut shard)
    }

    /// Checks the invariants of every shard.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        for (i, shard) in self.inner.shards.iter().enumerate() {
            shard
                .lock()
                .check_invariants()
                .map_err(|err| InvariantError::new(format!("shard {i}: {err}")))?;
        }
        Ok(())
    }

    fn shard_for(&self, key: &K) -> &Mutex<LfuCache<K, V>> {
        &self.inner.shards[self.inner.selector.shard_for_key(key)]
    }

    fn len_inner(&self) -> usize {
        self.inner.shards.iter().map(|s| s.lock().len()).sum()
    }
}

impl<K, V> ConcurrentCache<K, V> for SharedLfuCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Clone + Send,
{
    fn get(&self, key: &K) -> Option<V> {
        self.shard_for(key).lock().get(key)
    }

    fn put(&self, key: K, value: V) {
        self.shard_for(&key).lock().put(key, value);
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.shard_for(key).lock().remove(key)
    }

    fn clear(&self) {
        for shard in &self.inner.shards {
            shard.lock().clear();
        }
    }

    fn contains(&self, key: &K) -> bool {
        self.shard_for(key).lock().contains(key)
    }

    fn len(&self) -> usize {
        self.len_inner()
    }

    fn capacity(&self) -> usize {
        self.inner.capacity
    }
}

#[cfg(feature = "metrics")]
impl<K, V> SharedLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Counters of all shards merged into one snapshot.
    pub fn metrics_snapshot(&self) -> LfuMetricsSnapshot {
        self.inner
            .shards
            .iter()
            .map(|s| s.lock().metrics_snapshot())
            .fold(LfuMetricsSnapshot::default(), LfuMetricsSnapshot::merge)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LfuMetricsSnapshot> for SharedLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> LfuMetricsSnapshot {
        self.metrics_snapshot()
    }
}
