//! Authoritative-state server connection settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// WebSocket URL of the room server.
    pub url: String,
    /// Room to join or create.
    pub room: String,
    /// Connect + join timeout in seconds (valid range: 1-120).
    pub connect_timeout_secs: u32,
    /// Heartbeat interval in seconds (valid range: 5-300).
    pub heartbeat_interval_secs: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:2567".into(),
            room: "myoffice".into(),
            connect_timeout_secs: 15,
            heartbeat_interval_secs: 25,
        }
    }
}
