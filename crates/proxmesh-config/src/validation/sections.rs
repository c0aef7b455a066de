//! Per-section validators.

use crate::schema::ProxmeshConfig;

use super::helpers::{validate_non_empty, validate_range, validate_range_f64};

pub(crate) fn validate_server(errors: &mut Vec<String>, config: &ProxmeshConfig) {
    let server = &config.server;
    if !(server.url.starts_with("ws://") || server.url.starts_with("wss://")) {
        errors.push(format!(
            "server.url = {:?} must start with ws:// or wss://",
            server.url
        ));
    }
    validate_non_empty(errors, "server.room", &server.room);
    validate_range(
        errors,
        "server.connect_timeout_secs",
        server.connect_timeout_secs,
        1,
        120,
    );
    validate_range(
        errors,
        "server.heartbeat_interval_secs",
        server.heartbeat_interval_secs,
        5,
        300,
    );
}

pub(crate) fn validate_proximity(errors: &mut Vec<String>, config: &ProxmeshConfig) {
    validate_range_f64(
        errors,
        "proximity.threshold",
        config.proximity.threshold,
        1.0,
        10_000.0,
    );
    validate_range(
        errors,
        "proximity.sweep_interval_ms",
        config.proximity.sweep_interval_ms,
        1,
        1000,
    );
}

pub(crate) fn validate_movement(errors: &mut Vec<String>, config: &ProxmeshConfig) {
    let movement = &config.movement;
    validate_range_f64(errors, "movement.speed", movement.speed, 1.0, 2000.0);
    if !movement.spawn_x.is_finite() || !movement.spawn_y.is_finite() {
        errors.push("movement.spawn_x/spawn_y must be finite".into());
    }
    // 0 disables the keep-alive entirely.
    if movement.idle_keepalive_ms != 0 {
        validate_range(
            errors,
            "movement.idle_keepalive_ms",
            movement.idle_keepalive_ms,
            100,
            60_000,
        );
    }
}

pub(crate) fn validate_media(errors: &mut Vec<String>, config: &ProxmeshConfig) {
    validate_non_empty(errors, "media.stream_label", &config.media.stream_label);
}
