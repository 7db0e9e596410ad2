//! Operation counters for LFU caches (feature `metrics`).
//!
//! Recording happens inside [`LfuCache`](crate::policy::lfu::LfuCache) on every
//! call; reading goes through [`MetricsSnapshotProvider`](traits::MetricsSnapshotProvider)
//! and publishing through [`MetricsExporter`](traits::MetricsExporter).

pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use exporter::PrometheusTextExporter;
pub use metrics_impl::LfuMetrics;
pub use snapshot::LfuMetricsSnapshot;
pub use traits::{LfuMetricsRecorder, MetricsExporter, MetricsSnapshotProvider};
