//! Media transport that negotiates calls through the room's message relay.

use std::collections::HashMap;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::debug;

use proxmesh_common::{new_call_id, CallId, ParticipantId, TransientSessionError};

use crate::protocol::{messages, CallSignal};
use crate::room::RoomClient;

use super::transport::MediaTransport;
use super::types::{InboundCall, MediaEvent, StreamHandle};

/// How long an offer may go unanswered before the call is failed.
pub const UNANSWERED_CALL_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Signal Queue
// ---------------------------------------------------------------------------

enum Outgoing {
    Signal(CallSignal),
    /// Acknowledged once every signal queued before it was handed to the room.
    Flush(oneshot::Sender<()>),
}

/// Ordered, lossless hand-off of call signals to the room. A background
/// task waits for room queue capacity instead of dropping signals.
#[derive(Clone)]
struct SignalQueue {
    tx: mpsc::UnboundedSender<Outgoing>,
}

impl SignalQueue {
    fn spawn(room: RoomClient) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(signal_pump(room, rx));
        Self { tx }
    }

    fn push(&self, signal: CallSignal) {
        if self.tx.send(Outgoing::Signal(signal)).is_err() {
            debug!("Signal queue stopped, dropping call signal");
        }
    }

    async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Outgoing::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

async fn signal_pump(room: RoomClient, mut rx: mpsc::UnboundedReceiver<Outgoing>) {
    while let Some(item) = rx.recv().await {
        match item {
            Outgoing::Signal(signal) => match serde_json::to_value(&signal) {
                Ok(payload) => room.send_message(messages::CALL_SIGNAL, payload).await,
                Err(e) => debug!(error = %e, "Failed to encode call signal"),
            },
            Outgoing::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

enum Leg {
    /// We offered; waiting for the answer.
    Outbound { placed: Instant },
    /// They offered this stream; waiting for us to answer.
    InboundPending(StreamHandle),
    /// Offer and answer exchanged.
    Established,
}

struct RelayCall {
    remote: ParticipantId,
    leg: Leg,
}

/// Offer/answer/close signaling carried as `CALL_SIGNAL` room messages.
pub struct RelayTransport {
    local_id: ParticipantId,
    room: RoomClient,
    signals: SignalQueue,
    events: mpsc::UnboundedSender<MediaEvent>,
    calls: HashMap<CallId, RelayCall>,
    answer_timeout: Duration,
}

impl RelayTransport {
    /// Must be called from within a tokio runtime.
    pub fn new(
        local_id: ParticipantId,
        room: RoomClient,
    ) -> (Self, mpsc::UnboundedReceiver<MediaEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let transport = Self {
            local_id,
            signals: SignalQueue::spawn(room.clone()),
            room,
            events,
            calls: HashMap::new(),
            answer_timeout: UNANSWERED_CALL_TIMEOUT,
        };
        (transport, events_rx)
    }

    pub fn with_answer_timeout(mut self, timeout: Duration) -> Self {
        self.answer_timeout = timeout;
        self
    }

    fn emit(&self, event: MediaEvent) {
        let _ = self.events.send(event);
    }

    fn send_close(&self, call_id: &CallId, remote: &ParticipantId) {
        self.signals.push(CallSignal::Close {
            call_id: call_id.clone(),
            from: self.local_id.clone(),
            to: remote.clone(),
        });
    }
}

impl MediaTransport for RelayTransport {
    fn call(
        &mut self,
        remote: &ParticipantId,
        stream: &StreamHandle,
    ) -> Result<CallId, TransientSessionError> {
        if self.room.is_closed() {
            return Err(TransientSessionError::CallFailed {
                participant: remote.to_string(),
                reason: "room relay unavailable".to_string(),
            });
        }

        let call_id = new_call_id();
        self.signals.push(CallSignal::Offer {
            call_id: call_id.clone(),
            from: self.local_id.clone(),
            to: remote.clone(),
            stream: stream.clone(),
        });
        self.calls.insert(
            call_id.clone(),
            RelayCall {
                remote: remote.clone(),
                leg: Leg::Outbound {
                    placed: Instant::now(),
                },
            },
        );
        Ok(call_id)
    }

    fn answer(
        &mut self,
        call: &InboundCall,
        stream: &StreamHandle,
    ) -> Result<(), TransientSessionError> {
        let failed = |reason: &str| TransientSessionError::CallFailed {
            participant: call.remote.to_string(),
            reason: reason.to_string(),
        };

        if self.room.is_closed() {
            return Err(failed("room relay unavailable"));
        }
        let Some(entry) = self.calls.get_mut(&call.call_id) else {
            return Err(failed("call no longer pending"));
        };
        let Leg::InboundPending(offered) = &entry.leg else {
            return Err(failed("call is not awaiting an answer"));
        };
        let offered = offered.clone();
        entry.leg = Leg::Established;

        self.signals.push(CallSignal::Answer {
            call_id: call.call_id.clone(),
            from: self.local_id.clone(),
            to: call.remote.clone(),
            stream: stream.clone(),
        });
        self.emit(MediaEvent::StreamReceived {
            call_id: call.call_id.clone(),
            remote: call.remote.clone(),
            stream: offered,
        });
        Ok(())
    }

    fn close(&mut self, call_id: &CallId) {
        let Some(entry) = self.calls.remove(call_id) else {
            return;
        };
        self.send_close(call_id, &entry.remote);
        self.emit(MediaEvent::Closed {
            call_id: call_id.clone(),
            remote: entry.remote,
        });
    }

    fn expire_unanswered(&mut self) {
        let now = Instant::now();
        let mut expired: Vec<CallId> = self
            .calls
            .iter()
            .filter(|(_, call)| {
                matches!(call.leg, Leg::Outbound { placed } if now.duration_since(placed) >= self.answer_timeout)
            })
            .map(|(id, _)| id.clone())
            .collect();
        expired.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        for call_id in expired {
            let Some(entry) = self.calls.remove(&call_id) else {
                continue;
            };
            debug!(participant = %entry.remote, call = %call_id, "Call went unanswered");
            self.send_close(&call_id, &entry.remote);
            self.emit(MediaEvent::Failed {
                call_id,
                error: TransientSessionError::CallFailed {
                    participant: entry.remote.to_string(),
                    reason: "no answer".to_string(),
                },
                remote: entry.remote,
            });
        }
    }

    fn drained(&self) -> BoxFuture<'static, ()> {
        let signals = self.signals.clone();
        Box::pin(async move { signals.flush().await })
    }

    fn on_signal(&mut self, from: &ParticipantId, signal: CallSignal) {
        match signal {
            CallSignal::Offer {
                call_id, stream, ..
            } => {
                if self.calls.contains_key(&call_id) {
                    debug!(call = %call_id, "Duplicate offer ignored");
                    return;
                }
                self.calls.insert(
                    call_id.clone(),
                    RelayCall {
                        remote: from.clone(),
                        leg: Leg::InboundPending(stream.clone()),
                    },
                );
                self.emit(MediaEvent::Incoming(InboundCall {
                    call_id,
                    remote: from.clone(),
                    stream,
                }));
            }
            CallSignal::Answer {
                call_id, stream, ..
            } => {
                let Some(entry) = self.calls.get_mut(&call_id) else {
                    debug!(call = %call_id, "Answer for unknown call");
                    return;
                };
                if &entry.remote != from || !matches!(entry.leg, Leg::Outbound { .. }) {
                    debug!(call = %call_id, participant = %from, "Unexpected answer ignored");
                    return;
                }
                entry.leg = Leg::Established;
                self.emit(MediaEvent::StreamReceived {
                    call_id,
                    remote: from.clone(),
                    stream,
                });
            }
            CallSignal::Close { call_id, .. } => {
                match self.calls.get(&call_id) {
                    Some(entry) if &entry.remote == from => {}
                    _ => return,
                }
                self.calls.remove(&call_id);
                self.emit(MediaEvent::Closed {
                    call_id,
                    remote: from.clone(),
                });
            }
        }
    }
}
