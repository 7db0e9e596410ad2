//! # Cache Traits
//!
//! Two contracts sit at the seam between the cache engine and the services
//! that use it:
//!
//! ```text
//!   ┌─────────────────────────────────────┐   ┌─────────────────────────────────────┐
//!   │          CoreCache<K, V>            │   │       ConcurrentCache<K, V>         │
//!   │     (single owner, &mut self)       │   │    (shared instance, &self)         │
//!   │                                     │   │                                     │
//!   │  get(&mut, &K) → Option<V>          │   │  get(&, &K) → Option<V>             │
//!   │  put(&mut, K, V)                    │   │  put(&, K, V)                       │
//!   │  remove(&mut, &K) → Option<V>       │   │  remove(&, &K) → Option<V>          │
//!   │  clear(&mut)                        │   │  clear(&)                           │
//!   │  contains / len / capacity          │   │  contains / len / capacity          │
//!   └──────────────────┬──────────────────┘   └──────────────────┬──────────────────┘
//!                      │                                         │
//!                      ▼                                         ▼
//!               LfuCache<K, V>                       SharedLfuCache<K, V>
//!                                             (locks around one or more LfuCache)
//! ```
//!
//! Every operation is total: a miss is `None`, a put into a zero-capacity
//! cache is silently dropped. Values come back as owned copies so callers
//! never alias cache-internal state.

/// Operations of a single-owner cache.
///
/// `get` takes `&mut self` because a hit changes eviction order.
pub trait CoreCache<K, V> {
    /// Returns a copy of the value for `key` and records the access.
    fn get(&mut self, key: &K) -> Option<V>;

    /// Inserts or overwrites `key`, evicting one entry if the cache is full.
    fn put(&mut self, key: K, value: V);

    /// Removes `key`, returning its value if it was resident.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Drops every entry.
    fn clear(&mut self);

    /// Returns `true` if `key` is resident. Does not record an access.
    fn contains(&self, key: &K) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of resident entries, fixed at construction.
    fn capacity(&self) -> usize;
}

/// Operations of a cache instance shared between request workers.
///
/// Implementations serialize every call internally so that a multi-step
/// bucket migration can never interleave with another mutation.
pub trait ConcurrentCache<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Option<V>;

    fn put(&self, key: K, value: V);

    fn remove(&self, key: &K) -> Option<V>;

    fn clear(&self);

    fn contains(&self, key: &K) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;
}
