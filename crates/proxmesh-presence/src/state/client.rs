//! Remote state client over the room connection.

use tokio::sync::mpsc;
use tracing::debug;

use proxmesh_common::{ConnectionError, ParticipantId};

use crate::protocol::{messages, UpdatePlayerPayload};
use crate::room::{JoinedRoom, RoomClient, RoomConfig, RoomEvent};

use super::translator::{translate_events, StateTranslator};
use super::types::{LocalState, RemoteEvent};

const EVENT_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Joined session handle. Outgoing calls are fire-and-forget.
pub struct RemoteStateClient {
    local_id: ParticipantId,
    room: RoomClient,
}

impl RemoteStateClient {
    /// Join the room. Returns the handle and the event feed; the feed starts
    /// with a `Joined` for every participant already present.
    pub async fn join(
        config: RoomConfig,
    ) -> Result<(Self, mpsc::Receiver<RemoteEvent>), ConnectionError> {
        let (room, joined, room_rx) = RoomClient::connect(config).await?;
        Ok(Self::start(room, joined, room_rx))
    }

    /// Wire an already joined room into a client and spawn the translator.
    pub(crate) fn start(
        room: RoomClient,
        joined: JoinedRoom,
        room_rx: mpsc::Receiver<RoomEvent>,
    ) -> (Self, mpsc::Receiver<RemoteEvent>) {
        let local_id = joined.session_id;
        let mut translator = StateTranslator::new(local_id.clone());
        let initial = translator.snapshot(joined.players);

        let (event_tx, event_rx) = mpsc::channel(EVENT_CAPACITY);
        tokio::spawn(translate_events(translator, initial, room_rx, event_tx));

        (Self { local_id, room }, event_rx)
    }

    /// Build a client without a translator task; tests feed events directly.
    #[cfg(test)]
    pub(crate) fn from_parts(local_id: ParticipantId, room: RoomClient) -> Self {
        Self { local_id, room }
    }

    /// Server-assigned id of the local participant.
    pub fn local_id(&self) -> &ParticipantId {
        &self.local_id
    }

    pub fn room(&self) -> &RoomClient {
        &self.room
    }

    /// Publish the local avatar state as `UPDATE_PLAYER`.
    pub async fn send_local_update(&self, state: &LocalState) {
        let payload = UpdatePlayerPayload {
            x: state.position.x,
            y: state.position.y,
            anim: state.animation,
        };
        match serde_json::to_value(&payload) {
            Ok(value) => self.room.send_message(messages::UPDATE_PLAYER, value).await,
            Err(e) => debug!(error = %e, "Failed to encode local update"),
        }
    }

    /// Announce that our local stream is ready to be called.
    pub async fn send_ready_signal(&self) {
        let payload = serde_json::Value::String(self.local_id.to_string());
        self.room
            .send_message(messages::READY_TO_CONNECT, payload)
            .await;
    }

    pub async fn leave(&self) {
        self.room.leave().await;
    }
}
