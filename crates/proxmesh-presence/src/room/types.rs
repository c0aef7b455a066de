//! Configuration, wire envelope, and event/command enums for the room client.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use proxmesh_common::ParticipantId;

use crate::protocol::{PlayerState, StateChange};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for joining one room on the authoritative state server.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// WebSocket endpoint (`ws://` or `wss://`).
    pub url: String,
    /// Room name to join.
    pub room: String,
    /// Upper bound for connect + join handshake.
    pub connect_timeout_secs: u64,
    /// Heartbeat interval in seconds.
    pub heartbeat_interval_secs: u64,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:2567".to_string(),
            room: "myoffice".to_string(),
            connect_timeout_secs: 15,
            heartbeat_interval_secs: 25,
        }
    }
}

impl RoomConfig {
    pub(crate) fn topic(&self) -> String {
        format!("room:{}", self.room)
    }
}

// ---------------------------------------------------------------------------
// Wire Envelope
// ---------------------------------------------------------------------------

/// Event names carried in [`RoomEnvelope::event`].
pub(crate) mod events {
    pub const ROOM_JOIN: &str = "room_join";
    pub const ROOM_JOINED: &str = "room_joined";
    pub const ROOM_ERROR: &str = "room_error";
    pub const ROOM_LEAVE: &str = "room_leave";
    pub const ROOM_MESSAGE: &str = "room_message";
    pub const STATE_PATCH: &str = "state_patch";
    pub const HEARTBEAT: &str = "heartbeat";
}

/// JSON envelope for every frame on the room socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomEnvelope {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(rename = "ref", default)]
    pub msg_ref: Option<String>,
}

/// Result of a successful join: our session id and the initial state.
#[derive(Debug, Clone)]
pub struct JoinedRoom {
    pub session_id: ParticipantId,
    pub players: HashMap<String, PlayerState>,
}

// ---------------------------------------------------------------------------
// Events & Commands
// ---------------------------------------------------------------------------

/// Events emitted by the room connection after the join completed.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// Ordered batch of state changes.
    StatePatch(Vec<StateChange>),
    /// A message relayed by the room.
    Message {
        name: String,
        payload: serde_json::Value,
    },
    /// Server-side error that did not close the socket.
    Error(String),
    /// Socket closed. Emitted once; nothing follows it.
    Disconnected,
}

/// Commands sent to the connection task.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RoomCommand {
    Message {
        name: String,
        payload: serde_json::Value,
    },
    Leave,
}
