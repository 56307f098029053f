//! Configuration loading (`# 4.E` step 6: a load failure is logged and
//! recovered as an empty config, never fatal).

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Basis/Project configuration. Unknown keys are accepted and ignored by
/// `serde`'s default behavior (no `deny_unknown_fields`) so older configs
/// keep loading as the schema grows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// The service endpoint stamped onto specialized plugin instances.
    #[serde(default)]
    pub service_endpoint: String,

    /// Arbitrary string settings a plugin may read back via mappers.
    #[serde(default)]
    pub settings: std::collections::HashMap<String, String>,
}

/// Raised by [`Config::load`]; never surfaces from [`Config::load_or_default`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config at {path}: {source}")]
    Read {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file's contents were not valid config JSON.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        /// Path that failed to parse.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

impl Config {
    /// Loads a config from `path`, failing if the file is missing or
    /// malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Loads a config from `path`, logging a warning and falling back to
    /// [`Config::default`] on any failure — per `# 4.E` step 6, a config
    /// load failure is non-fatal.
    #[must_use]
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to load config, using default");
                Self::default()
            }
        }
    }
}
