//! Configuration schema types for proxmesh.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod media;
mod movement;
mod proximity;
mod server;
mod system;

pub use media::*;
pub use movement::*;
pub use proximity::*;
pub use server::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for the presence client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxmeshConfig {
    pub server: ServerConfig,
    pub proximity: ProximityConfig,
    pub movement: MovementConfig,
    pub media: MediaConfig,
    pub logging: LoggingConfig,
}
