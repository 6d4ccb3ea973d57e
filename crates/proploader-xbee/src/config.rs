use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Well-known UDP port of the bridge's application (config) service.
pub const DEFAULT_APP_SERVICE_PORT: u16 = 0x0BEE;

/// Well-known UDP port the bridge forwards serial traffic to.
pub const DEFAULT_SERIAL_SERVICE_PORT: u16 = 0x2616;

/// Tunables for discovery and the connected client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XbeeConfig {
    pub app_service_port: u16,
    pub serial_service_port: u16,
    /// How long each interface collects discovery replies, in milliseconds.
    pub discover_timeout_ms: u64,
    /// Upper bound on devices returned by one discovery run.
    pub max_results: usize,
    /// How long a config request waits for its reply, in milliseconds.
    pub reply_timeout_ms: u64,
    /// Upper bound on host interfaces probed.
    pub max_interfaces: usize,
}

impl XbeeConfig {
    pub fn discover_timeout(&self) -> Duration {
        Duration::from_millis(self.discover_timeout_ms)
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }
}

impl Default for XbeeConfig {
    fn default() -> Self {
        Self {
            app_service_port: DEFAULT_APP_SERVICE_PORT,
            serial_service_port: DEFAULT_SERIAL_SERVICE_PORT,
            discover_timeout_ms: 2000,
            max_results: 10,
            reply_timeout_ms: 2000,
            max_interfaces: 10,
        }
    }
}
