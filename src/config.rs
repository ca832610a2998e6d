//! Engine configuration.

use std::path::Path;

use serde::Deserialize;

use crate::diagnostics::BridgeError;

/// Configuration recognized at engine construction time.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Display name used for the root node's identifier.
    pub engine_name: String,
    /// Abort remaining executions after the first reported failure.
    pub abort_after_failure: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_name: "suitebridge".to_string(),
            abort_after_failure: false,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, BridgeError> {
        serde_yaml::from_str(text).map_err(|error| BridgeError::Config {
            message: error.to_string(),
        })
    }

    /// Loads a configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, BridgeError> {
        let text = std::fs::read_to_string(path).map_err(|error| BridgeError::Config {
            message: format!("{}: {}", path.display(), error),
        })?;
        Self::from_yaml_str(&text)
    }
}
