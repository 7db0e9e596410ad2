//! Cache-aside services for categories, tags and expenses.
//!
//! Each service owns a repository handle and one entity cache and follows
//! the same contract:
//!
//! ```text
//!   get_by_id(id) ──► cache.get(id) ──hit──► copy
//!                          │
//!                         miss
//!                          ▼
//!                   repository.find(id) ──none──► NotFound
//!                          │
//!                          ▼
//!                   cache.put(id, value) ──► value
//!
//!   create / update ──► repository write ──► cache.put(id, persisted)
//!   delete          ──► get_by_id ──► repository delete ──► cache.remove(id)
//! ```
//!
//! The cache never calls the repository; services do all the fetching.

pub mod category;
pub mod error;
pub mod exchange;
pub mod expense;
pub mod tag;

pub use category::CategoryService;
pub use error::{ServiceError, ServiceResult};
pub use exchange::{ExchangeRateProvider, FixedRateProvider};
pub use expense::ExpenseService;
pub use tag::TagService;

use tracing::{debug, info};

use crate::policy::lfu::EntityId;
use crate::repository::RepositoryResult;
use crate::traits::ConcurrentCache;

/// Cached copy on hit; otherwise loads from storage, populates the cache
/// and returns the loaded value.
///
/// The load and the `put` are not one atomic step. A delete that commits
/// between them leaves the loaded row cached until the next write to or
/// eviction of `id`. A delete that commits before the load is seen as
/// `NotFound` and caches nothing.
pub(crate) fn read_through<V, C>(
    cache: &C,
    entity: &'static str,
    id: EntityId,
    load: impl FnOnce(EntityId) -> RepositoryResult<Option<V>>,
) -> ServiceResult<V>
where
    V: Clone,
    C: ConcurrentCache<EntityId, V>,
{
    if let Some(hit) = cache.get(&id) {
        info!(entity, id, "retrieved from cache");
        return Ok(hit);
    }
    let value = load(id)?
        .ok_or_else(|| ServiceError::NotFound(format!("{entity} with id {id} not found")))?;
    cache.put(id, value.clone());
    info!(entity, id, "retrieved from repository and cached");
    Ok(value)
}

/// Caches every loaded item that is not already resident.
///
/// Residency is checked with `contains`, so items already cached are not
/// promoted by a bulk listing.
pub(crate) fn populate<V, C>(
    cache: &C,
    entity: &'static str,
    source: &'static str,
    items: &[V],
    id_of: impl Fn(&V) -> EntityId,
) where
    V: Clone,
    C: ConcurrentCache<EntityId, V>,
{
    for item in items {
        let id = id_of(item);
        if cache.contains(&id) {
            debug!(entity, id, source, "already cached");
        } else {
            cache.put(id, item.clone());
            info!(entity, id, source, "added to cache");
        }
    }
}
