pub use crate::builder::CacheBuilder;
pub use crate::caches::{CategoryCache, EntityCaches, ExpenseCache, TagCache};
pub use crate::config::{CacheConfig, EntityCacheConfig};
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::metrics::{LfuMetricsSnapshot, MetricsExporter, MetricsSnapshotProvider};
pub use crate::policy::lfu::{EntityId, LfuCache};
pub use crate::service::{CategoryService, ExpenseService, ServiceError, TagService};
pub use crate::sync::SharedLfuCache;
pub use crate::traits::{ConcurrentCache, CoreCache};
