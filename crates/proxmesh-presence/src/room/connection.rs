//! WebSocket handshake and the background connection loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use proxmesh_common::ConnectionError;

use super::handler::{handle_join_reply, handle_room_envelope, JoinReply};
use super::types::{events, JoinedRoom, RoomCommand, RoomConfig, RoomEnvelope, RoomEvent};

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ---------------------------------------------------------------------------
// Ref Counter
// ---------------------------------------------------------------------------

/// Monotonically increasing ref counter for outgoing envelopes.
static REF_COUNTER: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_ref() -> String {
    REF_COUNTER.fetch_add(1, Ordering::Relaxed).to_string()
}

fn envelope(topic: &str, event: &str, payload: serde_json::Value) -> RoomEnvelope {
    RoomEnvelope {
        topic: topic.to_string(),
        event: event.to_string(),
        payload,
        msg_ref: Some(next_ref()),
    }
}

async fn send_envelope<S>(writer: &mut S, envelope: &RoomEnvelope) -> bool
where
    S: Sink<WsMessage> + Unpin,
{
    match serde_json::to_string(envelope) {
        Ok(json) => writer.send(WsMessage::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(error = %e, event = %envelope.event, "Failed to encode envelope");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Handshake
// ---------------------------------------------------------------------------

/// Open the socket and join the room, bounded by the configured timeout.
pub(crate) async fn connect_and_join(
    config: &RoomConfig,
) -> Result<(WsStream, JoinedRoom), ConnectionError> {
    let timeout = Duration::from_secs(config.connect_timeout_secs);
    match tokio::time::timeout(timeout, handshake(config)).await {
        Ok(result) => result,
        Err(_elapsed) => Err(ConnectionError::Timeout(config.connect_timeout_secs)),
    }
}

async fn handshake(config: &RoomConfig) -> Result<(WsStream, JoinedRoom), ConnectionError> {
    info!(url = %config.url, room = %config.room, "Connecting to room server");

    let (mut ws, _) = tokio_tungstenite::connect_async(config.url.as_str())
        .await
        .map_err(|e| ConnectionError::Handshake(e.to_string()))?;

    let topic = config.topic();
    let join = envelope(
        &topic,
        events::ROOM_JOIN,
        serde_json::json!({ "room": config.room }),
    );
    if !send_envelope(&mut ws, &join).await {
        return Err(ConnectionError::Handshake(
            "failed to send join request".to_string(),
        ));
    }

    while let Some(msg) = ws.next().await {
        match msg {
            Ok(WsMessage::Text(text)) => {
                let Ok(reply) = serde_json::from_str::<RoomEnvelope>(&text) else {
                    debug!(text = %text, "Unrecognized frame during join");
                    continue;
                };
                match handle_join_reply(&reply) {
                    JoinReply::Joined(joined) => {
                        info!(
                            session_id = %joined.session_id,
                            players = joined.players.len(),
                            "Joined room"
                        );
                        return Ok((ws, joined));
                    }
                    JoinReply::Rejected(reason) => return Err(ConnectionError::Rejected(reason)),
                    JoinReply::Pending => {}
                }
            }
            Ok(WsMessage::Close(_)) => return Err(ConnectionError::Closed),
            Err(e) => return Err(ConnectionError::Handshake(e.to_string())),
            _ => {}
        }
    }

    Err(ConnectionError::Closed)
}

// ---------------------------------------------------------------------------
// Connection Loop
// ---------------------------------------------------------------------------

/// Background task owning a joined socket until it closes.
pub(crate) async fn connection_loop(
    ws: WsStream,
    config: RoomConfig,
    event_tx: mpsc::Sender<RoomEvent>,
    command_rx: mpsc::Receiver<RoomCommand>,
) {
    let topic = config.topic();
    let (ws_write, mut ws_read) = ws.split();
    let ws_write = Arc::new(Mutex::new(ws_write));

    let heartbeat_handle = tokio::spawn(heartbeat_task(
        Arc::clone(&ws_write),
        topic.clone(),
        config.heartbeat_interval_secs,
    ));
    let cmd_handle = tokio::spawn(command_forwarder(
        command_rx,
        Arc::clone(&ws_write),
        topic,
    ));

    while let Some(msg_result) = ws_read.next().await {
        match msg_result {
            Ok(WsMessage::Text(text)) => {
                match serde_json::from_str::<RoomEnvelope>(&text) {
                    Ok(env) => {
                        if let Some(event) = handle_room_envelope(&env) {
                            if event_tx.send(event).await.is_err() {
                                debug!("Room event receiver dropped");
                                break;
                            }
                        }
                    }
                    Err(_) => debug!(text = %text, "Unrecognized frame from room server"),
                }
            }
            Ok(WsMessage::Close(_)) => {
                info!("Room server closed connection");
                break;
            }
            Err(e) => {
                warn!(error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    heartbeat_handle.abort();
    cmd_handle.abort();
    let _ = event_tx.send(RoomEvent::Disconnected).await;
}

// ---------------------------------------------------------------------------
// Heartbeat
// ---------------------------------------------------------------------------

async fn heartbeat_task<S>(ws_write: Arc<Mutex<S>>, topic: String, interval_secs: u64)
where
    S: Sink<WsMessage> + Unpin,
{
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    // The first tick completes immediately; the join itself counts as activity.
    interval.tick().await;
    loop {
        interval.tick().await;
        let msg = envelope(&topic, events::HEARTBEAT, serde_json::json!({}));
        let mut writer = ws_write.lock().await;
        if !send_envelope(&mut *writer, &msg).await {
            break;
        }
    }
}

// ---------------------------------------------------------------------------
// Command Forwarder
// ---------------------------------------------------------------------------

async fn command_forwarder<S>(
    mut cmd_rx: mpsc::Receiver<RoomCommand>,
    cmd_write: Arc<Mutex<S>>,
    topic: String,
) where
    S: Sink<WsMessage> + Unpin,
{
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            RoomCommand::Message { name, payload } => {
                let msg = envelope(
                    &topic,
                    events::ROOM_MESSAGE,
                    serde_json::json!({ "name": name, "payload": payload }),
                );
                let mut writer = cmd_write.lock().await;
                if !send_envelope(&mut *writer, &msg).await {
                    debug!(name = %name, "Dropped room message on closed socket");
                }
            }
            RoomCommand::Leave => {
                let msg = envelope(&topic, events::ROOM_LEAVE, serde_json::json!({}));
                let mut writer = cmd_write.lock().await;
                let _ = send_envelope(&mut *writer, &msg).await;
                let _ = writer.send(WsMessage::Close(None)).await;
                info!("Left room");
                return;
            }
        }
    }
}
