use serde::{Deserialize, Serialize};

/// Local avatar movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub spawn_x: f64,
    pub spawn_y: f64,
    /// Walking speed in world units per second.
    pub speed: f64,
    /// Resend an unchanged local state at most this often, in milliseconds.
    /// `0` only sends when position or animation changed.
    pub idle_keepalive_ms: u32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            spawn_x: 800.0,
            spawn_y: 800.0,
            speed: 200.0,
            idle_keepalive_ms: 0,
        }
    }
}
