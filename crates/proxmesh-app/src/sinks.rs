//! Headless render and stream sinks that report through `tracing`.

use proxmesh_common::{ParticipantId, Position};
use proxmesh_presence::{
    AnimationState, FieldChange, LocalStream, RenderSink, StreamHandle, StreamSink,
};
use tracing::{debug, info};

/// Logs participant and stream lifecycle instead of drawing it.
#[derive(Debug, Default)]
pub struct LogSink;

impl RenderSink for LogSink {
    fn on_participant_added(
        &mut self,
        id: &ParticipantId,
        position: Position,
        animation: AnimationState,
    ) {
        info!(participant = %id, x = position.x, y = position.y, anim = %animation, "Participant joined");
    }

    fn on_participant_removed(&mut self, id: &ParticipantId) {
        info!(participant = %id, "Participant left");
    }

    fn on_participant_field_updated(&mut self, id: &ParticipantId, change: &FieldChange) {
        match change {
            FieldChange::X(x) => debug!(participant = %id, x, "Participant moved"),
            FieldChange::Y(y) => debug!(participant = %id, y, "Participant moved"),
            FieldChange::Animation(anim) => {
                debug!(participant = %id, anim = %anim, "Participant animation changed")
            }
        }
    }
}

impl StreamSink for LogSink {
    fn on_local_stream_ready(&mut self, stream: &LocalStream) {
        info!(
            stream = %stream.handle.id,
            audio = stream.audio_enabled,
            video = stream.video_enabled,
            "Local preview ready"
        );
    }

    fn on_remote_stream_available(&mut self, remote: &ParticipantId, stream: &StreamHandle) {
        info!(participant = %remote, stream = %stream.id, "Playing remote stream");
    }

    fn on_remote_stream_closed(&mut self, remote: &ParticipantId) {
        info!(participant = %remote, "Remote stream closed");
    }
}
