use std::path::{Path, PathBuf};

use proploader_loader::LoaderConfig;
#[cfg(feature = "xbee")]
use proploader_xbee::XbeeConfig;
use serde::{Deserialize, Serialize};

use crate::logging::LogConfig;

/// Errors reading a configuration document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Every tunable, as one JSON document.
///
/// All sections and fields are optional; anything missing takes its default.
///
/// ```json
/// {
///   "loader": { "handshake_timeout_ms": 2000 },
///   "xbee": { "discover_timeout_ms": 1000, "max_results": 4 },
///   "log": { "format": "json", "level": "debug" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub loader: LoaderConfig,
    #[cfg(feature = "xbee")]
    pub xbee: XbeeConfig,
    pub log: LogConfig,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Install the stderr subscriber described by the `log` section.
    #[cfg(feature = "logging")]
    pub fn init_logging(&self) {
        crate::logging::init_logging(self.log.format, self.log.level);
    }
}
