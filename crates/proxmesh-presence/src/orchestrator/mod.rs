//! Presence orchestrator: keeps the participant registry in step with the
//! room, sweeps proximity, and reconciles media sessions.
//!
//! Everything runs on one task. Remote events, media completions, local
//! movement and the sweep timer are multiplexed with `tokio::select!`, so
//! the registry and session map need no locks.

mod engine;
mod movement;
mod registry;
mod render;
mod run;


pub use engine::{ParticipantSnapshot, PresenceSnapshot};
pub use movement::{DirectionInput, LocalAvatar};
pub use render::RenderSink;
pub use run::{OrchestratorHandle, OrchestratorSettings, PresenceOrchestrator, RunOutcome};
