//! Typed remote-state events produced for the orchestrator.

use proxmesh_common::{ParticipantId, Position};

use crate::animation::AnimationState;
use crate::protocol::CallSignal;

/// A remote participant as first reported by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantRecord {
    pub id: ParticipantId,
    pub position: Position,
    pub animation: AnimationState,
}

/// The per-participant fields we follow after the join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchedField {
    X,
    Y,
    Animation,
}

impl WatchedField {
    /// Field name on the wire.
    pub fn wire_name(&self) -> &'static str {
        match self {
            WatchedField::X => "x",
            WatchedField::Y => "y",
            WatchedField::Animation => "anim",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "x" => Some(WatchedField::X),
            "y" => Some(WatchedField::Y),
            "anim" => Some(WatchedField::Animation),
            _ => None,
        }
    }
}

/// A new value for one watched field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldChange {
    X(f64),
    Y(f64),
    Animation(AnimationState),
}

impl FieldChange {
    pub fn field(&self) -> WatchedField {
        match self {
            FieldChange::X(_) => WatchedField::X,
            FieldChange::Y(_) => WatchedField::Y,
            FieldChange::Animation(_) => WatchedField::Animation,
        }
    }
}

/// The local avatar state that is published to the room.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocalState {
    pub position: Position,
    pub animation: AnimationState,
}

/// Events delivered to the orchestrator, in transport order.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteEvent {
    /// First sighting of a remote participant. Never the local id.
    Joined(ParticipantRecord),
    /// A watched field of an already joined participant changed.
    FieldChanged {
        id: ParticipantId,
        change: FieldChange,
    },
    /// A previously joined participant left.
    Left(ParticipantId),
    /// The participant's local stream became ready.
    ReadyToConnect(ParticipantId),
    /// Media call signaling addressed to us.
    Signal {
        from: ParticipantId,
        signal: CallSignal,
    },
    /// The room connection is gone. Preceded by `Left` for everyone.
    Disconnected,
}
