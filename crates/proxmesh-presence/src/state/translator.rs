//! Translates room events into `RemoteEvent`s.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use proxmesh_common::{ParticipantId, Position};

use crate::animation::AnimationState;
use crate::protocol::{messages, CallSignal, PlayerState, StateChange};
use crate::room::RoomEvent;

use super::types::{FieldChange, ParticipantRecord, RemoteEvent, WatchedField};

// ---------------------------------------------------------------------------
// Translator
// ---------------------------------------------------------------------------

/// Mirror of the remote participant map.
///
/// Keeps the last known record for every joined participant so that each
/// logical change is reported exactly once and never out of order.
pub(crate) struct StateTranslator {
    local_id: ParticipantId,
    known: HashMap<ParticipantId, ParticipantRecord>,
}

impl StateTranslator {
    pub(crate) fn new(local_id: ParticipantId) -> Self {
        Self {
            local_id,
            known: HashMap::new(),
        }
    }

    /// Replay the initial room state as joins, ordered by id.
    pub(crate) fn snapshot(&mut self, players: HashMap<String, PlayerState>) -> Vec<RemoteEvent> {
        let mut players: Vec<_> = players.into_iter().collect();
        players.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = Vec::new();
        for (id, player) in players {
            self.apply_add(ParticipantId::new(id), player, &mut out);
        }
        out
    }

    pub(crate) fn translate(&mut self, event: RoomEvent) -> Vec<RemoteEvent> {
        let mut out = Vec::new();
        match event {
            RoomEvent::StatePatch(changes) => {
                for change in changes {
                    self.apply_change(change, &mut out);
                }
            }
            RoomEvent::Message { name, payload } => self.apply_message(&name, payload, &mut out),
            RoomEvent::Error(reason) => {
                warn!(reason = %reason, "Room reported an error");
            }
            RoomEvent::Disconnected => {
                let mut ids: Vec<_> = self.known.drain().map(|(id, _)| id).collect();
                ids.sort();
                out.extend(ids.into_iter().map(RemoteEvent::Left));
                out.push(RemoteEvent::Disconnected);
            }
        }
        out
    }

    // -- state changes ------------------------------------------------------

    fn apply_change(&mut self, change: StateChange, out: &mut Vec<RemoteEvent>) {
        match change {
            StateChange::Add { id, player } => self.apply_add(ParticipantId::new(id), player, out),
            StateChange::Replace { id, field, value } => {
                let id = ParticipantId::new(id);
                if id == self.local_id {
                    return;
                }
                let Some(field) = WatchedField::from_wire(&field) else {
                    debug!(participant = %id, field = %field, "Ignoring unwatched field");
                    return;
                };
                let Some(change) = parse_field(field, &value) else {
                    debug!(participant = %id, field = field.wire_name(), value = %value, "Ignoring malformed field value");
                    return;
                };
                self.apply_field(id, change, out);
            }
            StateChange::Remove { id } => {
                let id = ParticipantId::new(id);
                if id == self.local_id {
                    return;
                }
                if self.known.remove(&id).is_some() {
                    out.push(RemoteEvent::Left(id));
                } else {
                    debug!(participant = %id, "Remove for unknown participant");
                }
            }
        }
    }

    fn apply_add(&mut self, id: ParticipantId, player: PlayerState, out: &mut Vec<RemoteEvent>) {
        if id == self.local_id {
            return;
        }

        let animation = player.anim.parse().unwrap_or_else(|_| {
            debug!(participant = %id, anim = %player.anim, "Unknown animation, using default");
            AnimationState::default()
        });

        if self.known.contains_key(&id) {
            // Replayed add: report only what differs.
            for change in [
                FieldChange::X(player.x),
                FieldChange::Y(player.y),
                FieldChange::Animation(animation),
            ] {
                self.apply_field(id.clone(), change, out);
            }
            return;
        }

        let record = ParticipantRecord {
            id: id.clone(),
            position: Position::new(player.x, player.y),
            animation,
        };
        self.known.insert(id, record.clone());
        out.push(RemoteEvent::Joined(record));
    }

    fn apply_field(&mut self, id: ParticipantId, change: FieldChange, out: &mut Vec<RemoteEvent>) {
        let Some(record) = self.known.get_mut(&id) else {
            debug!(participant = %id, field = change.field().wire_name(), "Update for unknown participant");
            return;
        };

        let changed = match change {
            FieldChange::X(x) => replace(&mut record.position.x, x),
            FieldChange::Y(y) => replace(&mut record.position.y, y),
            FieldChange::Animation(anim) => replace(&mut record.animation, anim),
        };
        if changed {
            out.push(RemoteEvent::FieldChanged { id, change });
        }
    }

    // -- messages -------------------------------------------------------------

    fn apply_message(&mut self, name: &str, payload: serde_json::Value, out: &mut Vec<RemoteEvent>) {
        match name {
            messages::READY_TO_CONNECT => {
                let Some(id) = payload.as_str().map(ParticipantId::from) else {
                    debug!(payload = %payload, "READY_TO_CONNECT without participant id");
                    return;
                };
                if id != self.local_id {
                    out.push(RemoteEvent::ReadyToConnect(id));
                }
            }
            messages::CALL_SIGNAL => match serde_json::from_value::<CallSignal>(payload) {
                Ok(signal) => {
                    if signal.to() != &self.local_id || signal.from() == &self.local_id {
                        return;
                    }
                    out.push(RemoteEvent::Signal {
                        from: signal.from().clone(),
                        signal,
                    });
                }
                Err(e) => debug!(error = %e, "Dropping malformed call signal"),
            },
            _ => debug!(name = %name, "Unhandled room message"),
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn parse_field(field: WatchedField, value: &serde_json::Value) -> Option<FieldChange> {
    match field {
        WatchedField::X => value.as_f64().map(FieldChange::X),
        WatchedField::Y => value.as_f64().map(FieldChange::Y),
        WatchedField::Animation => value
            .as_str()
            .and_then(|tag| tag.parse().ok())
            .map(FieldChange::Animation),
    }
}

// ---------------------------------------------------------------------------
// Translator Task
// ---------------------------------------------------------------------------

/// Background task: emits the initial joins, then translates the live feed
/// until the room disconnects.
pub(crate) async fn translate_events(
    mut translator: StateTranslator,
    initial: Vec<RemoteEvent>,
    mut room_rx: mpsc::Receiver<RoomEvent>,
    event_tx: mpsc::Sender<RemoteEvent>,
) {
    for event in initial {
        if event_tx.send(event).await.is_err() {
            return;
        }
    }

    while let Some(room_event) = room_rx.recv().await {
        let disconnected = room_event == RoomEvent::Disconnected;
        for event in translator.translate(room_event) {
            if event_tx.send(event).await.is_err() {
                return;
            }
        }
        if disconnected {
            return;
        }
    }

    // Connection task went away without saying so.
    for event in translator.translate(RoomEvent::Disconnected) {
        let _ = event_tx.send(event).await;
    }
}
