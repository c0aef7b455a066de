//! Capability traits for media session negotiation and stream rendering.

use futures_util::future::BoxFuture;

use proxmesh_common::{CallId, ParticipantId, TransientSessionError};

use crate::protocol::CallSignal;

use super::types::{InboundCall, LocalStream, StreamHandle};

/// Point-to-point media negotiation.
///
/// Methods return immediately. Outcomes (`StreamReceived`, `Closed`,
/// `Incoming`) arrive later as [`MediaEvent`](super::MediaEvent)s on the
/// channel the transport was created with.
pub trait MediaTransport: Send {
    /// Place an outbound call carrying `stream`.
    fn call(
        &mut self,
        remote: &ParticipantId,
        stream: &StreamHandle,
    ) -> Result<CallId, TransientSessionError>;

    /// Answer an inbound call with our stream.
    fn answer(
        &mut self,
        call: &InboundCall,
        stream: &StreamHandle,
    ) -> Result<(), TransientSessionError>;

    /// Hang up. Unknown or already closed calls are ignored.
    fn close(&mut self, call_id: &CallId);

    /// Feed negotiation traffic relayed by the room.
    fn on_signal(&mut self, _from: &ParticipantId, _signal: CallSignal) {}

    /// Give up on outbound calls that went unanswered for too long,
    /// reporting each as `Failed`.
    fn expire_unanswered(&mut self) {}

    /// Resolves once everything sent so far has left the transport.
    fn drained(&self) -> BoxFuture<'static, ()> {
        Box::pin(std::future::ready(()))
    }
}

/// Receives streams for playback.
pub trait StreamSink: Send {
    /// Self-view of the local stream.
    fn on_local_stream_ready(&mut self, _stream: &LocalStream) {}

    fn on_remote_stream_available(&mut self, remote: &ParticipantId, stream: &StreamHandle);

    fn on_remote_stream_closed(&mut self, remote: &ParticipantId);
}
