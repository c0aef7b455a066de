use serde::{Deserialize, Serialize};

/// Proximity sweep settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Distance (world units) at or under which two participants are connected.
    pub threshold: f64,
    /// Milliseconds between sweeps (valid range: 1-1000).
    pub sweep_interval_ms: u32,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            threshold: 200.0,
            sweep_interval_ms: 16,
        }
    }
}
