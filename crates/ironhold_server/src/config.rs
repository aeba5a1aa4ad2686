//! # Server Configuration
//!
//! ```toml
//! name = "Ironhold"
//! status_permission = "ironhold.command.status"
//! recipe_path = "data/recipes.toml"
//!
//! [engine]
//! max_repetitions = 64
//! ```

use std::path::{Path, PathBuf};

use ironhold_shared::{ConfigError, ConfigResult, EngineConfig};
use serde::{Deserialize, Serialize};

/// Permission required by the status command unless configured otherwise.
pub const DEFAULT_STATUS_PERMISSION: &str = "ironhold.command.status";

/// Top-level server configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Name shown in logs.
    pub name: String,
    /// Permission node gating `/status`.
    pub status_permission: String,
    /// Recipe file. The built-in recipes are used when unset.
    pub recipe_path: Option<PathBuf>,
    /// Transaction engine limits.
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "Ironhold".to_string(),
            status_permission: DEFAULT_STATUS_PERMISSION.to_string(),
            recipe_path: None,
            engine: EngineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parses and validates a config.
    ///
    /// # Errors
    ///
    /// `ConfigError::Parse` for malformed TOML, `ConfigError::Invalid` for
    /// unusable values.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file from disk.
    ///
    /// # Errors
    ///
    /// `ConfigError::Io` if the file cannot be read, otherwise the errors of
    /// [`ServerConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks every value.
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` for an empty permission node or bad engine limits.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.status_permission.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "status_permission must not be empty".to_string(),
            ));
        }
        self.engine.validate()
    }
}
