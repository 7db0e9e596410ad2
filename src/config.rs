//! Cache sizing configuration.
//!
//! One [`EntityCacheConfig`] per entity cache, grouped under [`CacheConfig`].
//! Loaded from TOML; every field is optional and falls back to the default
//! capacity of 100 entries in a single shard.
//!
//! ```toml
//! [categories]
//! capacity = 50
//!
//! [expenses]
//! capacity = 1000
//! shards = 8
//!
//! # [tags] omitted: defaults apply
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Capacity each entity cache gets when nothing is configured.
pub const DEFAULT_ENTITY_CAPACITY: i64 = 100;

/// Sizing of one entity cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EntityCacheConfig {
    /// Maximum resident entries. Signed so a negative value read from a file
    /// is reported instead of failing to parse.
    pub capacity: i64,

    /// Number of independently locked shards.
    pub shards: usize,
}

impl Default for EntityCacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_ENTITY_CAPACITY,
            shards: 1,
        }
    }
}

impl EntityCacheConfig {
    pub fn new(capacity: i64) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity < 0 {
            return Err(ConfigError::new(format!(
                "capacity must be >= 0, got {}",
                self.capacity
            )));
        }
        if self.shards == 0 {
            return Err(ConfigError::new("shards must be >= 1, got 0"));
        }
        if self.capacity > 0 && self.shards as u64 > self.capacity as u64 {
            return Err(ConfigError::new(format!(
                "shards ({}) must not exceed capacity ({})",
                self.shards, self.capacity
            )));
        }
        Ok(())
    }
}

/// Sizing of all three entity caches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub categories: EntityCacheConfig,
    pub expenses: EntityCacheConfig,
    pub tags: EntityCacheConfig,
}

impl CacheConfig {
    /// Rejects the first invalid section, naming it in the message.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, section) in [
            ("categories", &self.categories),
            ("expenses", &self.expenses),
            ("tags", &self.tags),
        ] {
            section
                .validate()
                .map_err(|err| ConfigError::new(format!("[{name}] {err}")))?;
        }
        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)
            .map_err(|err| ConfigError::new(format!("invalid cache config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            ConfigError::new(format!("cannot read cache config {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }
}
