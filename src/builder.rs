//! Validating builder for LFU caches.
//!
//! Capacities arrive as signed integers from configuration; the builder is
//! the one place they are checked before a cache is constructed.
//!
//! ## Example
//!
//! ```rust
//! use expensekit::builder::CacheBuilder;
//! use expensekit::traits::ConcurrentCache;
//!
//! let cache = CacheBuilder::new(100)
//!     .shards(4)
//!     .try_build_shared::<i64, String>()
//!     .unwrap();
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some("hello".to_string()));
//! assert_eq!(cache.shard_count(), 4);
//! ```

use std::hash::Hash;

use crate::config::EntityCacheConfig;
use crate::error::ConfigError;
use crate::policy::lfu::LfuCache;
use crate::sync::SharedLfuCache;

/// Builder for [`LfuCache`] and [`SharedLfuCache`] instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheBuilder {
    capacity: i64,
    shards: usize,
    seed: u64,
}

impl CacheBuilder {
    /// Starts a builder for a cache of `capacity` entries in one shard.
    pub fn new(capacity: i64) -> Self {
        Self {
            capacity,
            shards: 1,
            seed: 0,
        }
    }

    /// Starts a builder from one section of a [`CacheConfig`](crate::config::CacheConfig).
    pub fn from_config(config: &EntityCacheConfig) -> Self {
        Self::new(config.capacity).shards(config.shards)
    }

    /// Number of independently locked shards for [`try_build_shared`](Self::try_build_shared).
    pub fn shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    /// Seed for key-to-shard routing.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validated_capacity(&self) -> Result<usize, ConfigError> {
        usize::try_from(self.capacity).map_err(|_| {
            ConfigError::new(format!("capacity must be >= 0, got {}", self.capacity))
        })
    }

    /// Builds a single-owner cache. The shard setting is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the capacity is negative.
    pub fn try_build<K, V>(self) -> Result<LfuCache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        Ok(LfuCache::new(self.validated_capacity()?))
    }

    /// Builds a thread-safe cache.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the capacity is negative, the shard count
    /// is zero, or a non-zero capacity is split over more shards than it has
    /// entries.
    pub fn try_build_shared<K, V>(self) -> Result<SharedLfuCache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        let capacity = self.validated_capacity()?;
        if self.shards == 0 {
            return Err(ConfigError::new("shards must be >= 1, got 0"));
        }
        if capacity > 0 && self.shards > capacity {
            return Err(ConfigError::new(format!(
                "shards ({}) must not exceed capacity ({capacity})",
                self.shards
            )));
        }
        Ok(SharedLfuCache::with_shards(capacity, self.shards, self.seed))
    }
}
