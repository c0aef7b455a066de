//! Public handle for talking to the joined room.

use tokio::sync::mpsc;

use proxmesh_common::ConnectionError;

use super::connection::{connect_and_join, connection_loop};
use super::types::{JoinedRoom, RoomCommand, RoomConfig, RoomEvent};

const EVENT_CAPACITY: usize = 256;
const COMMAND_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Handle for sending messages into the joined room.
///
/// Cheap to clone; every clone feeds the same background connection task.
#[derive(Clone)]
pub struct RoomClient {
    command_tx: mpsc::Sender<RoomCommand>,
}

impl RoomClient {
    /// Connect and join. The returned receiver yields post-join events and
    /// ends with [`RoomEvent::Disconnected`].
    pub async fn connect(
        config: RoomConfig,
    ) -> Result<(Self, JoinedRoom, mpsc::Receiver<RoomEvent>), ConnectionError> {
        let (ws, joined) = connect_and_join(&config).await?;

        let (event_tx, event_rx) = mpsc::channel(EVENT_CAPACITY);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        tokio::spawn(connection_loop(ws, config, event_tx, command_rx));

        Ok((Self { command_tx }, joined, event_rx))
    }

    /// A client not backed by a socket; commands land on the returned receiver.
    #[cfg(test)]
    pub(crate) fn detached(capacity: usize) -> (Self, mpsc::Receiver<RoomCommand>) {
        let (command_tx, command_rx) = mpsc::channel(capacity);
        (Self { command_tx }, command_rx)
    }

    /// Send a named message to the room.
    pub async fn send_message(&self, name: &str, payload: serde_json::Value) {
        let _ = self
            .command_tx
            .send(RoomCommand::Message {
                name: name.to_string(),
                payload,
            })
            .await;
    }

    /// `true` once the connection task stopped taking commands.
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    /// Resolves when the connection task has stopped taking commands:
    /// after it forwarded a leave, or when the socket dropped.
    pub async fn closed(&self) {
        self.command_tx.closed().await
    }

    /// Leave the room and close the socket.
    pub async fn leave(&self) {
        let _ = self.command_tx.send(RoomCommand::Leave).await;
    }
}
