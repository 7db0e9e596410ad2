//! Deterministic key-to-shard routing for [`SharedLfuCache`](crate::sync::SharedLfuCache).
//!
//! Each shard owns an independent LFU cache behind its own lock, so a key must
//! always land on the same shard for `get`/`put`/`remove` to agree.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Maps keys to a shard index in `[0, shards)` using a seeded hash.
///
/// # Example
///
/// ```
/// use expensekit::ds::ShardSelector;
///
/// let selector = ShardSelector::new(4, 7);
/// let shard = selector.shard_for_key(&42_i64);
/// assert!(shard < 4);
/// assert_eq!(selector.shard_for_key(&42_i64), shard);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector; a shard count of zero is treated as one.
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: shards.max(1),
            seed,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards
    }

    pub fn shard_for_key<K: Hash + ?Sized>(&self, key: &K) -> usize {
        if self.shards == 1 {
            return 0;
        }
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        (hasher.finish() % self.shards as u64) as usize
    }
}

impl Default for ShardSelector {
    fn default() -> Self {
        Self::new(1, 0)
    }
}
