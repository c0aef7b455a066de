use proxmesh_common::{ParticipantId, Position};

use crate::animation::AnimationState;
use crate::state::FieldChange;

/// Receives participant lifecycle updates for display.
pub trait RenderSink: Send {
    fn on_participant_added(
        &mut self,
        id: &ParticipantId,
        position: Position,
        animation: AnimationState,
    );

    fn on_participant_removed(&mut self, id: &ParticipantId);

    fn on_participant_field_updated(&mut self, id: &ParticipantId, change: &FieldChange);
}
