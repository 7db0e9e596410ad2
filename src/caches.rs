//! The three entity caches.
//!
//! Each is an independent [`SharedLfuCache`] keyed by [`EntityId`]; they only
//! differ in value type and configured size.
//!
//! ```
//! use expensekit::caches::EntityCaches;
//! use expensekit::config::CacheConfig;
//! use expensekit::traits::ConcurrentCache;
//!
//! let caches = EntityCaches::from_config(&CacheConfig::default()).unwrap();
//! assert_eq!(caches.categories.capacity(), 100);
//! assert_eq!(caches.expenses.capacity(), 100);
//! assert_eq!(caches.tags.capacity(), 100);
//! ```

use crate::builder::CacheBuilder;
use crate::config::CacheConfig;
use crate::error::ConfigError;
use crate::model::{Category, Expense, Tag};
use crate::policy::lfu::EntityId;
use crate::sync::SharedLfuCache;

pub use crate::config::DEFAULT_ENTITY_CAPACITY;

pub type CategoryCache = SharedLfuCache<EntityId, Category>;
pub type ExpenseCache = SharedLfuCache<EntityId, Expense>;
pub type TagCache = SharedLfuCache<EntityId, Tag>;

/// One cache per entity type. Cloning shares the underlying caches.
#[derive(Debug, Clone)]
pub struct EntityCaches {
    pub categories: CategoryCache,
    pub expenses: ExpenseCache,
    pub tags: TagCache,
}

impl EntityCaches {
    /// Validates `config` and builds all three caches.
    pub fn from_config(config: &CacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            categories: CacheBuilder::from_config(&config.categories).try_build_shared()?,
            expenses: CacheBuilder::from_config(&config.expenses).try_build_shared()?,
            tags: CacheBuilder::from_config(&config.tags).try_build_shared()?,
        })
    }

    /// Writes all three caches' counters, labelled `categories`, `expenses`
    /// and `tags`.
    #[cfg(feature = "metrics")]
    pub fn export_metrics<W: std::io::Write + Send>(
        &self,
        exporter: &mut crate::metrics::PrometheusTextExporter<W>,
    ) {
        use crate::metrics::MetricsExporter;

        exporter.set_cache_label("categories");
        exporter.export(&self.categories.metrics_snapshot());
        exporter.set_cache_label("expenses");
        exporter.export(&self.expenses.metrics_snapshot());
        exporter.set_cache_label("tags");
        exporter.export(&self.tags.metrics_snapshot());
    }
}

impl Default for EntityCaches {
    /// Capacity 100 each, single shard.
    fn default() -> Self {
        let capacity = DEFAULT_ENTITY_CAPACITY as usize;
        Self {
            categories: SharedLfuCache::new(capacity),
            expenses: SharedLfuCache::new(capacity),
            tags: SharedLfuCache::new(capacity),
        }
    }
}
