//! Thin WebSocket client for the authoritative room server.
//!
//! Connects once, joins a single room, then forwards state patches and
//! relayed messages as [`RoomEvent`]s. Heartbeats run in the background.
//! There is no reconnect: a lost socket ends in [`RoomEvent::Disconnected`].

mod client;
mod connection;
mod handler;
mod types;

pub use client::RoomClient;
pub use types::{JoinedRoom, RoomConfig, RoomEnvelope, RoomEvent};

#[cfg(test)]
pub(crate) use types::RoomCommand;
