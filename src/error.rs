//! Errors raised by the caches themselves.
//!
//! Runtime operations (`get`/`put`/`remove`/`clear`) never fail; a miss is
//! `None`. A cache can only refuse to be built ([`ConfigError`]) or report a
//! broken internal structure from `check_invariants` ([`InvariantError`]).
//!
//! ```
//! use expensekit::policy::lfu::LfuCache;
//!
//! let err = LfuCache::<i64, String>::try_new(-1).unwrap_err();
//! assert_eq!(err.message(), "capacity must be >= 0, got -1");
//! ```

use thiserror::Error;

/// A cache capacity, shard layout or config file was rejected.
///
/// Produced by [`LfuCache::try_new`](crate::policy::lfu::LfuCache::try_new),
/// the [`CacheBuilder`](crate::builder::CacheBuilder) `try_build*` methods and
/// [`CacheConfig`](crate::config::CacheConfig) loading. Section-level
/// failures are prefixed with the section name, e.g. `[expenses] ...`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ConfigError(String);

impl ConfigError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Index, frequency buckets and minimum frequency of a cache disagree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct InvariantError(String);

impl InvariantError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::CacheBuilder;

    #[test]
    fn builder_errors_name_the_bad_setting() {
        let err = CacheBuilder::new(-4).try_build::<i64, u8>().unwrap_err();
        assert_eq!(err.to_string(), "capacity must be >= 0, got -4");

        let err = CacheBuilder::new(10)
            .shards(0)
            .try_build_shared::<i64, u8>()
            .unwrap_err();
        assert_eq!(err.message(), "shards must be >= 1, got 0");
    }

    #[test]
    fn invariant_message_is_display() {
        let err = InvariantError::new("bucket 3 is empty");
        assert_eq!(err.to_string(), err.message());
    }

    #[test]
    fn errors_cross_threads() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<InvariantError>();
        assert_error::<ConfigError>();
    }
}
