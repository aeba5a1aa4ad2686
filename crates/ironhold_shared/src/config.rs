//! # Engine Configuration
//!
//! Limits for the transaction engine, loaded once at startup from TOML.
//!
//! ```toml
//! max_actions = 512
//! max_repetitions = 64
//! default_max_stack = 64
//! event_bus_capacity = 1024
//! ```
//!
//! Every field is optional; missing fields fall back to `constants`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_EVENT_BUS_CAPACITY, DEFAULT_MAX_ACTIONS, DEFAULT_MAX_REPETITIONS, DEFAULT_MAX_STACK,
};

/// Errors raised while loading configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for the expected schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Limits applied by the inventory transaction engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum raw actions accepted in a single transaction.
    pub max_actions: usize,
    /// Maximum batch multiplier a crafting transaction may infer.
    pub max_repetitions: u32,
    /// Stack size used by inventories that do not declare their own.
    pub default_max_stack: u32,
    /// Capacity of the post-commit event channel.
    pub event_bus_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_actions: DEFAULT_MAX_ACTIONS,
            max_repetitions: DEFAULT_MAX_REPETITIONS,
            default_max_stack: DEFAULT_MAX_STACK,
            event_bus_capacity: DEFAULT_EVENT_BUS_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Parses a config from a TOML string and validates it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML and
    /// `ConfigError::Invalid` for zero limits.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file from disk.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise the
    /// errors of [`EngineConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks that every limit is usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first zero limit.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_actions == 0 {
            return Err(ConfigError::Invalid("max_actions must be at least 1".to_string()));
        }
        if self.max_repetitions == 0 {
            return Err(ConfigError::Invalid(
                "max_repetitions must be at least 1".to_string(),
            ));
        }
        if self.default_max_stack == 0 {
            return Err(ConfigError::Invalid(
                "default_max_stack must be at least 1".to_string(),
            ));
        }
        if self.event_bus_capacity == 0 {
            return Err(ConfigError::Invalid(
                "event_bus_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
