//! expensekit: LFU entity caches for an expense tracking service.
//!
//! The engine is [`policy::lfu::LfuCache`], an O(1) least-frequently-used
//! cache with recency tie-breaking. [`sync::SharedLfuCache`] serializes
//! access for request workers; [`caches`] instantiates it once per entity
//! type, and [`service`] shows the cache-aside contract against a
//! [`repository`].

pub mod builder;
pub mod caches;
pub mod config;
pub mod ds;
pub mod error;
pub mod logging;
pub mod model;
pub mod policy;
pub mod repository;
pub mod service;
pub mod sync;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;
