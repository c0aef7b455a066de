//! Config + CLI overrides → orchestrator settings.

use std::time::Duration;

use proxmesh_common::Position;
use proxmesh_config::ProxmeshConfig;
use proxmesh_presence::{CaptureConstraints, OrchestratorSettings, RoomConfig};

use crate::cli::Args;

pub fn orchestrator_settings(config: &ProxmeshConfig, args: &Args) -> OrchestratorSettings {
    let server = &config.server;
    let keepalive_ms = config.movement.idle_keepalive_ms;
    OrchestratorSettings {
        room: RoomConfig {
            url: args.url.clone().unwrap_or_else(|| server.url.clone()),
            room: args.room.clone().unwrap_or_else(|| server.room.clone()),
            connect_timeout_secs: u64::from(server.connect_timeout_secs),
            heartbeat_interval_secs: u64::from(server.heartbeat_interval_secs),
        },
        threshold: config.proximity.threshold,
        sweep_interval: Duration::from_millis(u64::from(config.proximity.sweep_interval_ms)),
        spawn: Position::new(config.movement.spawn_x, config.movement.spawn_y),
        idle_keepalive: (keepalive_ms > 0).then(|| Duration::from_millis(u64::from(keepalive_ms))),
        constraints: CaptureConstraints {
            audio: config.media.audio,
            video: config.media.video,
        },
    }
}
