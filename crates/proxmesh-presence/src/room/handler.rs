//! Incoming envelope handling: join replies and post-join frames.

use std::collections::HashMap;

use tracing::{debug, warn};

use proxmesh_common::ParticipantId;

use crate::protocol::{PlayerState, StateChange};

use super::types::{events, JoinedRoom, RoomEnvelope, RoomEvent};

// ---------------------------------------------------------------------------
// Join Reply
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) enum JoinReply {
    Joined(JoinedRoom),
    Rejected(String),
    /// Not a reply to our join; keep waiting.
    Pending,
}

/// Classify a frame received while waiting for the join to complete.
pub(crate) fn handle_join_reply(envelope: &RoomEnvelope) -> JoinReply {
    match envelope.event.as_str() {
        events::ROOM_JOINED => match parse_joined(&envelope.payload) {
            Some(joined) => JoinReply::Joined(joined),
            None => JoinReply::Rejected("malformed room_joined payload".to_string()),
        },
        events::ROOM_ERROR => JoinReply::Rejected(error_reason(&envelope.payload)),
        _ => {
            debug!(event = %envelope.event, "Ignoring frame before join reply");
            JoinReply::Pending
        }
    }
}

/// Parse `{session_id, state: {players: {id: {x, y, anim}}}}`.
///
/// Individual malformed player records are skipped; a missing session id
/// invalidates the whole reply.
pub(crate) fn parse_joined(payload: &serde_json::Value) -> Option<JoinedRoom> {
    let session_id = payload.get("session_id")?.as_str()?;
    if session_id.is_empty() {
        return None;
    }

    let mut players = HashMap::new();
    if let Some(obj) = payload
        .get("state")
        .and_then(|s| s.get("players"))
        .and_then(|p| p.as_object())
    {
        for (id, value) in obj {
            match serde_json::from_value::<PlayerState>(value.clone()) {
                Ok(player) => {
                    players.insert(id.clone(), player);
                }
                Err(e) => debug!(participant = %id, error = %e, "Skipping malformed player record"),
            }
        }
    }

    Some(JoinedRoom {
        session_id: ParticipantId::new(session_id),
        players,
    })
}

fn error_reason(payload: &serde_json::Value) -> String {
    payload
        .get("reason")
        .and_then(|r| r.as_str())
        .unwrap_or("unknown error")
        .to_string()
}

// ---------------------------------------------------------------------------
// Message Handler
// ---------------------------------------------------------------------------

/// Translate a post-join frame into a [`RoomEvent`], if it carries one.
pub(crate) fn handle_room_envelope(envelope: &RoomEnvelope) -> Option<RoomEvent> {
    match envelope.event.as_str() {
        events::STATE_PATCH => {
            let changes = envelope.payload.get("changes")?;
            match serde_json::from_value::<Vec<StateChange>>(changes.clone()) {
                Ok(changes) => Some(RoomEvent::StatePatch(changes)),
                Err(e) => {
                    warn!(error = %e, "Dropping malformed state patch");
                    None
                }
            }
        }
        events::ROOM_MESSAGE => {
            let name = envelope.payload.get("name")?.as_str()?.to_string();
            let payload = envelope
                .payload
                .get("payload")
                .cloned()
                .unwrap_or(serde_json::Value::Null);
            debug!(name = %name, "Room message received");
            Some(RoomEvent::Message { name, payload })
        }
        events::ROOM_ERROR => {
            let reason = error_reason(&envelope.payload);
            warn!(reason = %reason, "Room error");
            Some(RoomEvent::Error(reason))
        }
        events::HEARTBEAT => None,
        _ => {
            debug!(event = %envelope.event, "Unhandled room event");
            None
        }
    }
}
