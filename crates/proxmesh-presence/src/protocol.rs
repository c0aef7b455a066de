//! Protocol types for the room and call-signaling payloads.
//!
//! These are the application-level payloads that ride inside room
//! envelopes. The envelope itself is handled by `room`.

use serde::{Deserialize, Serialize};

use proxmesh_common::{CallId, ParticipantId};

use crate::animation::AnimationState;
use crate::media::StreamHandle;

// ---------------------------------------------------------------------------
// Room message names
// ---------------------------------------------------------------------------

/// Names of the messages exchanged through the room.
pub mod messages {
    /// Local avatar state, `{x, y, anim}`.
    pub const UPDATE_PLAYER: &str = "UPDATE_PLAYER";
    /// "My media stream is ready; peers may now call me."
    pub const READY_TO_CONNECT: &str = "READY_TO_CONNECT";
    /// Relayed media-call negotiation, see [`super::CallSignal`].
    pub const CALL_SIGNAL: &str = "CALL_SIGNAL";
}

// ---------------------------------------------------------------------------
// Room state
// ---------------------------------------------------------------------------

/// One participant record as the server stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub x: f64,
    pub y: f64,
    pub anim: String,
}

/// Payload of `UPDATE_PLAYER`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePlayerPayload {
    pub x: f64,
    pub y: f64,
    pub anim: AnimationState,
}

/// A single ordered change inside a `state_patch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StateChange {
    Add {
        id: String,
        player: PlayerState,
    },
    Replace {
        id: String,
        field: String,
        value: serde_json::Value,
    },
    Remove {
        id: String,
    },
}

// ---------------------------------------------------------------------------
// Call signaling
// ---------------------------------------------------------------------------

/// Media-call negotiation relayed through the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CallSignal {
    /// Caller offers its stream.
    Offer {
        call_id: CallId,
        from: ParticipantId,
        to: ParticipantId,
        stream: StreamHandle,
    },
    /// Callee answers with its own stream.
    Answer {
        call_id: CallId,
        from: ParticipantId,
        to: ParticipantId,
        stream: StreamHandle,
    },
    /// Either side hangs up.
    Close {
        call_id: CallId,
        from: ParticipantId,
        to: ParticipantId,
    },
}

impl CallSignal {
    pub fn call_id(&self) -> &CallId {
        match self {
            CallSignal::Offer { call_id, .. }
            | CallSignal::Answer { call_id, .. }
            | CallSignal::Close { call_id, .. } => call_id,
        }
    }

    pub fn from(&self) -> &ParticipantId {
        match self {
            CallSignal::Offer { from, .. }
            | CallSignal::Answer { from, .. }
            | CallSignal::Close { from, .. } => from,
        }
    }

    pub fn to(&self) -> &ParticipantId {
        match self {
            CallSignal::Offer { to, .. }
            | CallSignal::Answer { to, .. }
            | CallSignal::Close { to, .. } => to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Facing;

    #[test]
    fn state_change_wire_format() {
        let json = r#"[
            {"op":"add","id":"a","player":{"x":1.0,"y":2.0,"anim":"idle_front"}},
            {"op":"replace","id":"a","field":"x","value":5.5},
            {"op":"remove","id":"a"}
        ]"#;
        let changes: Vec<StateChange> = serde_json::from_str(json).unwrap();
        assert_eq!(changes.len(), 3);
        assert!(matches!(&changes[0], StateChange::Add { id, player } if id == "a" && player.y == 2.0));
        assert!(matches!(&changes[1], StateChange::Replace { field, .. } if field == "x"));
        assert!(matches!(&changes[2], StateChange::Remove { id } if id == "a"));
    }

    #[test]
    fn update_player_payload_uses_anim_tag() {
        let payload = UpdatePlayerPayload {
            x: 800.0,
            y: 810.0,
            anim: AnimationState::walk(Facing::Front),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["anim"], "walk_front");
        assert_eq!(value["y"], 810.0);
    }

    #[test]
    fn call_signal_is_tagged_by_kind() {
        let signal = CallSignal::Close {
            call_id: CallId::new("c1"),
            from: ParticipantId::from("a"),
            to: ParticipantId::from("b"),
        };
        let value = serde_json::to_value(&signal).unwrap();
        assert_eq!(value["kind"], "close");
        assert_eq!(value["call_id"], "c1");

        let back: CallSignal = serde_json::from_value(value).unwrap();
        assert_eq!(back.call_id().as_str(), "c1");
        assert_eq!(back.from().as_str(), "a");
        assert_eq!(back.to().as_str(), "b");
    }
}
