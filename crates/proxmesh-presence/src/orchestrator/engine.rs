//! Single-owner state of the orchestrator: registry, sessions and the
//! local avatar, mutated only from the run loop.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use proxmesh_common::{MediaCaptureError, ParticipantId, Position};

use crate::animation::AnimationState;
use crate::media::{MediaEvent, PeerSessionManager, SessionState, StreamHandle};
use crate::proximity::is_within_range;
use crate::room::RoomClient;
use crate::state::{LocalState, RemoteEvent, RemoteStateClient};

use super::registry::LocalParticipantRegistry;
use super::render::RenderSink;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Point-in-time view for status output.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceSnapshot {
    pub local_id: ParticipantId,
    pub local: LocalState,
    pub media_ready: bool,
    pub audio_enabled: bool,
    pub video_enabled: bool,
    pub participants: Vec<ParticipantSnapshot>,
}

impl PresenceSnapshot {
    /// Number of participants with an active media session.
    pub fn connected_count(&self) -> usize {
        self.participants
            .iter()
            .filter(|p| p.session == Some(SessionState::Active))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantSnapshot {
    pub id: ParticipantId,
    pub position: Position,
    pub animation: AnimationState,
    pub session: Option<SessionState>,
}

// ---------------------------------------------------------------------------
// Core
// ---------------------------------------------------------------------------

pub(crate) struct PresenceCore {
    state: RemoteStateClient,
    registry: LocalParticipantRegistry,
    sessions: PeerSessionManager,
    render: Box<dyn RenderSink>,
    threshold: f64,
    local: LocalState,
    last_sent: Option<(LocalState, Instant)>,
    idle_keepalive: Option<Duration>,
    /// Set once capture succeeded or failed. No sweep runs before.
    capture_settled: bool,
}

impl PresenceCore {
    pub(crate) fn new(
        state: RemoteStateClient,
        sessions: PeerSessionManager,
        render: Box<dyn RenderSink>,
        threshold: f64,
        spawn: Position,
        idle_keepalive: Option<Duration>,
    ) -> Self {
        let registry = LocalParticipantRegistry::new(state.local_id().clone());
        Self {
            state,
            registry,
            sessions,
            render,
            threshold,
            local: LocalState {
                position: spawn,
                animation: AnimationState::default(),
            },
            last_sent: None,
            idle_keepalive,
            capture_settled: false,
        }
    }

    pub(crate) fn sessions(&self) -> &PeerSessionManager {
        &self.sessions
    }

    pub(crate) fn sessions_mut(&mut self) -> &mut PeerSessionManager {
        &mut self.sessions
    }

    pub(crate) fn room(&self) -> &RoomClient {
        self.state.room()
    }

    // -- remote state ---------------------------------------------------------

    /// Apply one remote event. Returns `false` once the room is gone.
    pub(crate) fn handle_remote_event(&mut self, event: RemoteEvent) -> bool {
        match event {
            RemoteEvent::Joined(record) => {
                if self.registry.insert(&record) {
                    info!(participant = %record.id, x = record.position.x, y = record.position.y, "Participant joined");
                    self.render
                        .on_participant_added(&record.id, record.position, record.animation);
                } else {
                    debug!(participant = %record.id, "Duplicate join ignored");
                }
            }
            RemoteEvent::FieldChanged { id, change } => {
                if self.registry.apply(&id, &change) {
                    self.render.on_participant_field_updated(&id, &change);
                } else {
                    debug!(participant = %id, field = change.field().wire_name(), "Update for unregistered participant");
                }
            }
            RemoteEvent::Left(id) => self.participant_left(&id),
            RemoteEvent::ReadyToConnect(id) => {
                debug!(participant = %id, "Participant ready to connect");
                self.sessions.reconnect(&id);
            }
            RemoteEvent::Signal { from, signal } => self.sessions.on_signal(&from, signal),
            RemoteEvent::Disconnected => {
                for id in self.registry.ids() {
                    self.participant_left(&id);
                }
                info!("Room connection lost");
                return false;
            }
        }
        true
    }

    fn participant_left(&mut self, id: &ParticipantId) {
        if self.registry.remove(id) {
            info!(participant = %id, "Participant left");
            self.render.on_participant_removed(id);
        } else {
            debug!(participant = %id, "Leave for unregistered participant");
        }
        self.sessions.remove_all(id);
    }

    // -- proximity --------------------------------------------------------------

    /// Level-triggered reconciliation of sessions against proximity.
    pub(crate) fn sweep(&mut self) {
        if !self.capture_settled {
            return;
        }
        self.sessions.expire_unanswered();

        // Sessions exist only for registered participants.
        for id in self.sessions.session_ids() {
            if self.registry.get(&id).is_none() {
                debug!(participant = %id, "Dropping session to unregistered participant");
                self.sessions.remove_all(&id);
            }
        }

        let local = self.local.position;
        for (id, remote) in self.registry.iter() {
            if is_within_range(&local, &remote.position, self.threshold) {
                self.sessions.connect(id);
            } else {
                self.sessions.disconnect(id);
            }
        }
    }

    // -- media ----------------------------------------------------------------

    pub(crate) fn handle_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::Incoming(call) if self.registry.get(&call.remote).is_none() => {
                self.sessions.reject_inbound(&call);
            }
            MediaEvent::Incoming(call) => {
                let local_id = self.state.local_id().clone();
                self.sessions.accept_inbound(call, &local_id);
            }
            other => self.sessions.handle_media_event(other),
        }
    }

    /// Settle local capture; announces readiness on success.
    pub(crate) async fn on_capture_settled(
        &mut self,
        result: Result<StreamHandle, MediaCaptureError>,
    ) {
        self.sessions.complete_initialization(result);
        self.capture_settled = true;
        if self.sessions.is_ready() {
            self.state.send_ready_signal().await;
        }
    }

    // -- local avatar ---------------------------------------------------------

    /// Record the local state and publish it if it changed, or if the
    /// keep-alive interval elapsed since the last identical update.
    pub(crate) async fn local_position_changed(&mut self, local: LocalState) {
        self.local = local;

        let now = Instant::now();
        if let Some((sent, at)) = &self.last_sent {
            let keepalive_due = self
                .idle_keepalive
                .is_some_and(|interval| now.duration_since(*at) >= interval);
            if *sent == local && !keepalive_due {
                return;
            }
        }

        self.state.send_local_update(&local).await;
        self.last_sent = Some((local, now));
    }

    // -- status / teardown ------------------------------------------------------

    pub(crate) fn snapshot(&self) -> PresenceSnapshot {
        let participants = self
            .registry
            .ids()
            .into_iter()
            .filter_map(|id| {
                let entry = self.registry.get(&id)?;
                Some(ParticipantSnapshot {
                    session: self.sessions.session_state(&id),
                    position: entry.position,
                    animation: entry.animation,
                    id,
                })
            })
            .collect();

        let stream = self.sessions.local_stream();
        PresenceSnapshot {
            local_id: self.state.local_id().clone(),
            local: self.local,
            media_ready: stream.is_some(),
            audio_enabled: stream.is_some_and(|s| s.audio_enabled),
            video_enabled: stream.is_some_and(|s| s.video_enabled),
            participants,
        }
    }

    /// Close every session. With `leave_room`, the close signals are handed
    /// to the room before the leave.
    pub(crate) async fn shutdown(&mut self, leave_room: bool) {
        self.sessions.shutdown();
        if leave_room {
            self.sessions.signals_drained().await;
            self.state.leave().await;
        }
    }
}
