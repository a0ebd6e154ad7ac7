//! Converter configuration.
//!
//! Loaded from `.normalize/transpile.toml` in the project root when present.
//!
//! Example:
//! ```toml
//! instance_receiver = "this"
//! service_lookup_method = "resolve"
//! release_method = "dispose"
//! well_known_types = ["Math", "Console", "Task", "Colors"]
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Receiver text for implicit instance-member access.
    pub instance_receiver: String,
    /// Runtime member used for service lookups, keyed by type name.
    pub service_lookup_method: String,
    /// Member called when a resource-scoped block exits.
    pub release_method: String,
    /// Member awaited when an asynchronous resource-scoped block exits.
    pub async_release_method: String,
    /// Capitalized names that denote static types, never instance members.
    pub well_known_types: Vec<String>,
    /// One level of indentation in emitted code.
    pub indent: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            instance_receiver: "this".into(),
            service_lookup_method: "getService".into(),
            release_method: "dispose".into(),
            async_release_method: "disposeAsync".into(),
            well_known_types: [
                "Math", "MathF", "Console", "Task", "ValueTask", "String", "Object", "Array",
                "JSON", "Promise", "Number", "Date", "Debug", "Trace", "Enumerable",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            indent: "  ".into(),
        }
    }
}

impl ConvertConfig {
    /// Load configuration for a project. A missing file yields defaults.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(".normalize").join("transpile.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_file(&path)
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn is_well_known_type(&self, name: &str) -> bool {
        self.well_known_types.iter().any(|t| t == name)
    }
}
