//! Configuration for the dependency resolution system.
//!
//! Hosts may build a [`DependsConfig`] in code or read it from TOML:
//!
//! ```toml
//! priority = -10
//! allow_self_match = false
//! seed = 42
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Tunables for `DependsSystem`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependsConfig {
    /// Position in the system pipeline. Lower runs first.
    pub priority: i32,
    /// Whether an entity may satisfy its own dependency slots while it is
    /// being admitted.
    pub allow_self_match: bool,
    /// Seed for the candidate shuffler. `None` seeds from the wall clock.
    pub seed: Option<u64>,
}

impl Default for DependsConfig {
    fn default() -> Self {
        Self {
            priority: 0,
            allow_self_match: true,
            seed: None,
        }
    }
}

impl DependsConfig {
    /// Parse a config from a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config = Self::from_toml_str(&content)?;
        debug!("Loaded depends config from {:?}", path);
        Ok(config)
    }

    /// Builder-style seed override.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
