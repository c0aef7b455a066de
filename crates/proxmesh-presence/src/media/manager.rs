//! Peer session manager: one media session per remote participant.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tracing::{debug, info, warn};

use proxmesh_common::{CallId, MediaCaptureError, ParticipantId};

use crate::protocol::CallSignal;

use super::capture::MediaCapture;
use super::transport::{MediaTransport, StreamSink};
use super::types::{
    CaptureConstraints, InboundCall, LocalStream, MediaEvent, SessionState, StreamHandle,
};

// ---------------------------------------------------------------------------
// Session Bookkeeping
// ---------------------------------------------------------------------------

enum Readiness {
    /// Capture not settled yet.
    Pending,
    Ready(LocalStream),
    /// Capture failed; stays this way for the life of the manager.
    Failed(MediaCaptureError),
    /// Torn down.
    Disposed,
}

struct PeerSession {
    /// The call that owns the session. Once active, the only call.
    primary: CallId,
    state: SessionState,
    /// Other calls to the same participant still racing the primary.
    contenders: Vec<CallId>,
}

impl PeerSession {
    fn connecting(call_id: CallId) -> Self {
        Self {
            primary: call_id,
            state: SessionState::Connecting,
            contenders: Vec::new(),
        }
    }

    fn tracks(&self, call_id: &CallId) -> bool {
        &self.primary == call_id || self.contenders.contains(call_id)
    }

    fn all_calls(&self) -> impl Iterator<Item = &CallId> {
        std::iter::once(&self.primary).chain(self.contenders.iter())
    }
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Owns the local stream and the set of media sessions, keyed by remote id.
///
/// Every method is synchronous and meant to be called from a single owner
/// task. Transport completions are fed back in via [`handle_media_event`].
///
/// [`handle_media_event`]: PeerSessionManager::handle_media_event
pub struct PeerSessionManager {
    capture: Arc<dyn MediaCapture>,
    constraints: CaptureConstraints,
    transport: Box<dyn MediaTransport>,
    sink: Box<dyn StreamSink>,
    readiness: Readiness,
    sessions: HashMap<ParticipantId, PeerSession>,
}

impl PeerSessionManager {
    pub fn new(
        capture: Arc<dyn MediaCapture>,
        constraints: CaptureConstraints,
        transport: Box<dyn MediaTransport>,
        sink: Box<dyn StreamSink>,
    ) -> Self {
        Self {
            capture,
            constraints,
            transport,
            sink,
            readiness: Readiness::Pending,
            sessions: HashMap::new(),
        }
    }

    // -- local stream ---------------------------------------------------------

    /// The capture request, detached from `self` so the owner can poll it
    /// alongside other work. Settle it with [`complete_initialization`].
    ///
    /// [`complete_initialization`]: PeerSessionManager::complete_initialization
    pub fn capture_task(
        &self,
    ) -> impl Future<Output = Result<StreamHandle, MediaCaptureError>> + Send + 'static {
        let capture = Arc::clone(&self.capture);
        let constraints = self.constraints;
        async move { capture.capture(constraints).await }
    }

    /// Record the capture outcome. Only the first outcome counts.
    pub fn complete_initialization(&mut self, result: Result<StreamHandle, MediaCaptureError>) {
        if !matches!(self.readiness, Readiness::Pending) {
            warn!("Local stream already settled, ignoring capture result");
            return;
        }
        match result {
            Ok(handle) => {
                let stream = LocalStream::new(handle);
                info!(stream = %stream.handle.id, "Local stream ready");
                self.sink.on_local_stream_ready(&stream);
                self.readiness = Readiness::Ready(stream);
            }
            Err(e) => {
                warn!(error = %e, "Local capture failed, media sessions disabled");
                self.readiness = Readiness::Failed(e);
            }
        }
    }

    /// Capture and settle in one step.
    pub async fn initialize_local_stream(&mut self) -> Result<(), MediaCaptureError> {
        let result = self.capture_task().await;
        let outcome = result.as_ref().map(|_| ()).map_err(|e| e.clone());
        self.complete_initialization(result);
        outcome
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.readiness, Readiness::Ready(_))
    }

    pub fn capture_error(&self) -> Option<&MediaCaptureError> {
        match &self.readiness {
            Readiness::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn local_stream(&self) -> Option<&LocalStream> {
        match &self.readiness {
            Readiness::Ready(stream) => Some(stream),
            _ => None,
        }
    }

    /// Enable or disable the local audio track. Returns `false` when there
    /// is no local audio track to toggle.
    pub fn set_audio_enabled(&mut self, enabled: bool) -> bool {
        match &mut self.readiness {
            Readiness::Ready(stream) if stream.handle.audio => {
                stream.audio_enabled = enabled;
                info!(enabled, "Local audio toggled");
                true
            }
            _ => false,
        }
    }

    /// Enable or disable the local video track. Returns `false` when there
    /// is no local video track to toggle.
    pub fn set_video_enabled(&mut self, enabled: bool) -> bool {
        match &mut self.readiness {
            Readiness::Ready(stream) if stream.handle.video => {
                stream.video_enabled = enabled;
                info!(enabled, "Local video toggled");
                true
            }
            _ => false,
        }
    }

    // -- reconciliation -------------------------------------------------------

    pub fn session_state(&self, remote: &ParticipantId) -> Option<SessionState> {
        self.sessions.get(remote).map(|s| s.state)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Ids with an open or pending session, sorted.
    pub fn session_ids(&self) -> Vec<ParticipantId> {
        let mut ids: Vec<ParticipantId> = self.sessions.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Open a session to `remote` unless one exists or we are not ready.
    pub fn connect(&mut self, remote: &ParticipantId) {
        if self.sessions.contains_key(remote) {
            return;
        }
        let Readiness::Ready(stream) = &self.readiness else {
            return;
        };

        match self.transport.call(remote, &stream.handle) {
            Ok(call_id) => {
                debug!(participant = %remote, call = %call_id, "Calling participant");
                self.sessions
                    .insert(remote.clone(), PeerSession::connecting(call_id));
            }
            Err(e) => {
                warn!(participant = %remote, error = %e, "Outbound call failed");
            }
        }
    }

    /// Close and forget the session to `remote`, if any.
    pub fn disconnect(&mut self, remote: &ParticipantId) {
        let Some(session) = self.sessions.remove(remote) else {
            return;
        };
        for call_id in session.all_calls() {
            self.transport.close(call_id);
        }
        if session.state == SessionState::Active {
            info!(participant = %remote, "Session closed");
            self.sink.on_remote_stream_closed(remote);
        } else {
            debug!(participant = %remote, "Pending session abandoned");
        }
    }

    /// Forced teardown for a participant that left. Any call still in
    /// flight is closed when it activates.
    pub fn remove_all(&mut self, remote: &ParticipantId) {
        self.disconnect(remote);
    }

    /// Redial a session that never got answered, e.g. because the remote
    /// was not ready when we called.
    pub fn reconnect(&mut self, remote: &ParticipantId) {
        if self.session_state(remote) != Some(SessionState::Connecting) {
            return;
        }
        debug!(participant = %remote, "Participant ready, redialing");
        self.disconnect(remote);
        self.connect(remote);
    }

    /// Answer an inbound call if our stream is ready.
    ///
    /// Two participants calling each other at once is settled by id: the
    /// call placed by the lower id is the one both sides keep.
    pub fn accept_inbound(&mut self, call: InboundCall, local_id: &ParticipantId) {
        let Readiness::Ready(stream) = &self.readiness else {
            debug!(participant = %call.remote, call = %call.call_id, "Not ready, leaving call unanswered");
            return;
        };

        match self.sessions.get(&call.remote).map(|s| s.state) {
            Some(SessionState::Active) => {
                debug!(participant = %call.remote, call = %call.call_id, "Already active, rejecting duplicate call");
                self.transport.close(&call.call_id);
                return;
            }
            Some(SessionState::Connecting) if local_id < &call.remote => {
                debug!(participant = %call.remote, call = %call.call_id, "Our call takes precedence");
                self.transport.close(&call.call_id);
                return;
            }
            _ => {}
        }

        if let Err(e) = self.transport.answer(&call, &stream.handle) {
            warn!(participant = %call.remote, error = %e, "Failed to answer call");
            return;
        }

        debug!(participant = %call.remote, call = %call.call_id, "Answered call");
        match self.sessions.get_mut(&call.remote) {
            Some(session) => session.contenders.push(call.call_id),
            None => {
                self.sessions
                    .insert(call.remote, PeerSession::connecting(call.call_id));
            }
        }
    }

    /// Hang up an inbound call without answering it.
    pub fn reject_inbound(&mut self, call: &InboundCall) {
        debug!(participant = %call.remote, call = %call.call_id, "Rejecting inbound call");
        self.transport.close(&call.call_id);
    }

    /// Fail outbound calls that were never answered. The failures come
    /// back as [`MediaEvent::Failed`].
    pub fn expire_unanswered(&mut self) {
        self.transport.expire_unanswered();
    }

    /// Resolves once every signal issued so far reached the transport's wire.
    pub fn signals_drained(&self) -> BoxFuture<'static, ()> {
        self.transport.drained()
    }

    /// Relay negotiation traffic into the transport.
    pub fn on_signal(&mut self, from: &ParticipantId, signal: CallSignal) {
        self.transport.on_signal(from, signal);
    }

    /// Apply a transport completion.
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::Incoming(call) => {
                debug!(participant = %call.remote, "Inbound call needs accept_inbound");
            }
            MediaEvent::StreamReceived {
                call_id,
                remote,
                stream,
            } => self.on_stream_received(call_id, remote, stream),
            MediaEvent::Closed { call_id, remote } => self.on_call_ended(&call_id, &remote),
            MediaEvent::Failed {
                call_id,
                remote,
                error,
            } => {
                warn!(participant = %remote, call = %call_id, error = %error, "Session failed");
                self.on_call_ended(&call_id, &remote);
            }
        }
    }

    fn on_stream_received(&mut self, call_id: CallId, remote: ParticipantId, stream: StreamHandle) {
        let Some(session) = self.sessions.get_mut(&remote) else {
            debug!(participant = %remote, call = %call_id, "Closing call with no session");
            self.transport.close(&call_id);
            return;
        };
        if !session.tracks(&call_id) {
            debug!(participant = %remote, call = %call_id, "Closing untracked call");
            self.transport.close(&call_id);
            return;
        }

        if session.state == SessionState::Active {
            if session.primary != call_id {
                session.contenders.retain(|c| c != &call_id);
                self.transport.close(&call_id);
            }
            return;
        }

        // First activation wins; every other call for this participant goes.
        let losers: Vec<CallId> = session
            .all_calls()
            .filter(|c| *c != &call_id)
            .cloned()
            .collect();
        session.primary = call_id.clone();
        session.contenders.clear();
        session.state = SessionState::Active;
        for loser in &losers {
            self.transport.close(loser);
        }

        info!(participant = %remote, call = %call_id, "Session active");
        self.sink.on_remote_stream_available(&remote, &stream);
    }

    fn on_call_ended(&mut self, call_id: &CallId, remote: &ParticipantId) {
        let Some(session) = self.sessions.get_mut(remote) else {
            return;
        };

        if &session.primary != call_id {
            session.contenders.retain(|c| c != call_id);
            return;
        }

        if session.state == SessionState::Connecting && !session.contenders.is_empty() {
            session.primary = session.contenders.remove(0);
            return;
        }

        let was_active = session.state == SessionState::Active;
        self.sessions.remove(remote);
        if was_active {
            info!(participant = %remote, call = %call_id, "Session closed by transport");
            self.sink.on_remote_stream_closed(remote);
        } else {
            debug!(participant = %remote, call = %call_id, "Pending call ended");
        }
    }

    /// Close every session and release the local stream.
    pub fn shutdown(&mut self) {
        for remote in &self.session_ids() {
            self.disconnect(remote);
        }
        if matches!(self.readiness, Readiness::Ready(_)) {
            info!("Local stream released");
        }
        self.readiness = Readiness::Disposed;
    }
}
