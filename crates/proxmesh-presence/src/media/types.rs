//! Media stream descriptors and session lifecycle events.

use serde::{Deserialize, Serialize};

use proxmesh_common::{CallId, ParticipantId, TransientSessionError};

/// Opaque descriptor of a media stream and the tracks it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamHandle {
    pub id: String,
    pub label: String,
    pub audio: bool,
    pub video: bool,
}

impl StreamHandle {
    pub fn new(id: impl Into<String>, label: impl Into<String>, audio: bool, video: bool) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            audio,
            video,
        }
    }
}

/// The captured local stream plus its per-track enabled flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStream {
    pub handle: StreamHandle,
    pub audio_enabled: bool,
    pub video_enabled: bool,
}

impl LocalStream {
    pub fn new(handle: StreamHandle) -> Self {
        Self {
            audio_enabled: handle.audio,
            video_enabled: handle.video,
            handle,
        }
    }
}

/// Which tracks to request from the capture device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub audio: bool,
    pub video: bool,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }
}

/// A call offered to us by a remote participant.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundCall {
    pub call_id: CallId,
    pub remote: ParticipantId,
    pub stream: StreamHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Call placed or answered, no remote stream yet.
    Connecting,
    /// Remote stream flowing.
    Active,
}

/// Completions reported by a media transport.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    Incoming(InboundCall),
    StreamReceived {
        call_id: CallId,
        remote: ParticipantId,
        stream: StreamHandle,
    },
    Closed {
        call_id: CallId,
        remote: ParticipantId,
    },
    Failed {
        call_id: CallId,
        remote: ParticipantId,
        error: TransientSessionError,
    },
}
