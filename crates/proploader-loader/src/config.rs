use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for a boot session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// How long to wait for the handshake reply and version, in milliseconds.
    pub handshake_timeout_ms: u64,
}

impl LoaderConfig {
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            handshake_timeout_ms: 2000,
        }
    }
}
