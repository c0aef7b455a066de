//! Local media capture.

use async_trait::async_trait;
use tracing::info;

use proxmesh_common::MediaCaptureError;

use super::types::{CaptureConstraints, StreamHandle};

/// Source of the local outgoing stream.
#[async_trait]
pub trait MediaCapture: Send + Sync {
    async fn capture(&self, constraints: CaptureConstraints)
        -> Result<StreamHandle, MediaCaptureError>;
}

/// Capture backend for headless clients: yields a stream descriptor with
/// the requested tracks and no device behind it.
#[derive(Debug, Clone)]
pub struct StaticCapture {
    label: String,
}

impl StaticCapture {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

#[async_trait]
impl MediaCapture for StaticCapture {
    async fn capture(
        &self,
        constraints: CaptureConstraints,
    ) -> Result<StreamHandle, MediaCaptureError> {
        if !constraints.audio && !constraints.video {
            return Err(MediaCaptureError::Unsupported(
                "capture requested with no audio and no video".to_string(),
            ));
        }

        let handle = StreamHandle::new(
            proxmesh_common::new_id(),
            self.label.clone(),
            constraints.audio,
            constraints.video,
        );
        info!(
            stream = %handle.id,
            audio = handle.audio,
            video = handle.video,
            "Captured local stream"
        );
        Ok(handle)
    }
}
