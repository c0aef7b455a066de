//! Fakes for the capability traits, shared by the unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use proxmesh_common::{
    CallId, MediaCaptureError, ParticipantId, Position, TransientSessionError,
};

use crate::animation::AnimationState;
use crate::media::{
    CaptureConstraints, InboundCall, LocalStream, MediaCapture, MediaTransport, StreamHandle,
    StreamSink,
};
use crate::orchestrator::RenderSink;
use crate::protocol::CallSignal;
use crate::state::FieldChange;

pub(crate) fn pid(id: &str) -> ParticipantId {
    ParticipantId::from(id)
}

pub(crate) fn stream(id: &str) -> StreamHandle {
    StreamHandle::new(id, "test", true, true)
}

// ---------------------------------------------------------------------------
// Capture
// ---------------------------------------------------------------------------

pub(crate) struct FakeCapture {
    result: Result<StreamHandle, MediaCaptureError>,
}

impl FakeCapture {
    pub(crate) fn ok(id: &str) -> Self {
        Self {
            result: Ok(stream(id)),
        }
    }

    pub(crate) fn failing(error: MediaCaptureError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl MediaCapture for FakeCapture {
    async fn capture(
        &self,
        _constraints: CaptureConstraints,
    ) -> Result<StreamHandle, MediaCaptureError> {
        self.result.clone()
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub(crate) struct TransportLog {
    pub calls: Vec<(ParticipantId, CallId)>,
    pub answers: Vec<CallId>,
    pub closes: Vec<CallId>,
    pub signals: Vec<(ParticipantId, CallSignal)>,
    pub expiry_checks: usize,
}

/// Records every request; completions are injected by the test.
pub(crate) struct FakeTransport {
    log: Arc<Mutex<TransportLog>>,
    next_call: u32,
    fail_calls: bool,
}

impl FakeTransport {
    pub(crate) fn new() -> (Self, Arc<Mutex<TransportLog>>) {
        let log = Arc::new(Mutex::new(TransportLog::default()));
        let transport = Self {
            log: Arc::clone(&log),
            next_call: 0,
            fail_calls: false,
        };
        (transport, log)
    }

    pub(crate) fn failing() -> (Self, Arc<Mutex<TransportLog>>) {
        let (mut transport, log) = Self::new();
        transport.fail_calls = true;
        (transport, log)
    }
}

impl MediaTransport for FakeTransport {
    fn call(
        &mut self,
        remote: &ParticipantId,
        _stream: &StreamHandle,
    ) -> Result<CallId, TransientSessionError> {
        if self.fail_calls {
            return Err(TransientSessionError::CallFailed {
                participant: remote.to_string(),
                reason: "fake failure".to_string(),
            });
        }
        self.next_call += 1;
        let call_id = CallId::new(format!("out-{}", self.next_call));
        self.log
            .lock()
            .unwrap()
            .calls
            .push((remote.clone(), call_id.clone()));
        Ok(call_id)
    }

    fn answer(
        &mut self,
        call: &InboundCall,
        _stream: &StreamHandle,
    ) -> Result<(), TransientSessionError> {
        self.log.lock().unwrap().answers.push(call.call_id.clone());
        Ok(())
    }

    fn close(&mut self, call_id: &CallId) {
        self.log.lock().unwrap().closes.push(call_id.clone());
    }

    fn on_signal(&mut self, from: &ParticipantId, signal: CallSignal) {
        self.log.lock().unwrap().signals.push((from.clone(), signal));
    }

    fn expire_unanswered(&mut self) {
        self.log.lock().unwrap().expiry_checks += 1;
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StreamNote {
    LocalReady(String),
    Available(ParticipantId, String),
    Closed(ParticipantId),
}

#[derive(Default)]
pub(crate) struct RecordingStreamSink {
    notes: Arc<Mutex<Vec<StreamNote>>>,
}

impl RecordingStreamSink {
    pub(crate) fn new() -> (Self, Arc<Mutex<Vec<StreamNote>>>) {
        let sink = Self::default();
        let notes = Arc::clone(&sink.notes);
        (sink, notes)
    }
}

impl StreamSink for RecordingStreamSink {
    fn on_local_stream_ready(&mut self, stream: &LocalStream) {
        self.notes
            .lock()
            .unwrap()
            .push(StreamNote::LocalReady(stream.handle.id.clone()));
    }

    fn on_remote_stream_available(&mut self, remote: &ParticipantId, stream: &StreamHandle) {
        self.notes
            .lock()
            .unwrap()
            .push(StreamNote::Available(remote.clone(), stream.id.clone()));
    }

    fn on_remote_stream_closed(&mut self, remote: &ParticipantId) {
        self.notes
            .lock()
            .unwrap()
            .push(StreamNote::Closed(remote.clone()));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RenderNote {
    Added(ParticipantId, Position, AnimationState),
    Removed(ParticipantId),
    Updated(ParticipantId, FieldChange),
}

#[derive(Default)]
pub(crate) struct RecordingRenderSink {
    notes: Arc<Mutex<Vec<RenderNote>>>,
}

impl RecordingRenderSink {
    pub(crate) fn new() -> (Self, Arc<Mutex<Vec<RenderNote>>>) {
        let sink = Self::default();
        let notes = Arc::clone(&sink.notes);
        (sink, notes)
    }
}

impl RenderSink for RecordingRenderSink {
    fn on_participant_added(
        &mut self,
        id: &ParticipantId,
        position: Position,
        animation: AnimationState,
    ) {
        self.notes
            .lock()
            .unwrap()
            .push(RenderNote::Added(id.clone(), position, animation));
    }

    fn on_participant_removed(&mut self, id: &ParticipantId) {
        self.notes
            .lock()
            .unwrap()
            .push(RenderNote::Removed(id.clone()));
    }

    fn on_participant_field_updated(&mut self, id: &ParticipantId, change: &FieldChange) {
        self.notes
            .lock()
            .unwrap()
            .push(RenderNote::Updated(id.clone(), *change));
    }
}
