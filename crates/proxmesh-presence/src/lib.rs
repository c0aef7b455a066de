//! Presence synchronization and proximity-driven media mesh.
//!
//! A client joins one room on the authoritative state server, mirrors the
//! remote participants locally, and keeps a point-to-point media session
//! open with every participant standing within the proximity threshold.

pub mod animation;
pub mod media;
pub mod orchestrator;
pub mod protocol;
pub mod proximity;
pub mod room;
pub mod state;

#[cfg(test)]
mod testing;

pub use animation::{AnimationState, Facing, Motion};
pub use media::{
    CaptureConstraints, LocalStream, MediaCapture, MediaTransport, PeerSessionManager,
    SessionState, StaticCapture, StreamHandle, StreamSink,
};
pub use orchestrator::{
    DirectionInput, LocalAvatar, OrchestratorHandle, OrchestratorSettings, ParticipantSnapshot,
    PresenceOrchestrator, PresenceSnapshot, RenderSink, RunOutcome,
};
pub use proximity::is_within_range;
pub use room::{RoomClient, RoomConfig};
pub use state::{FieldChange, LocalState, ParticipantRecord, RemoteEvent, RemoteStateClient};
