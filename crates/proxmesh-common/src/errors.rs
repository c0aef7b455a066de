use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// The authoritative-state session could not be established.
///
/// Fatal for the session; the core never retries on its own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    #[error("connection timed out after {0}s")]
    Timeout(u64),

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("join rejected by server: {0}")]
    Rejected(String),

    #[error("connection closed before the room was joined")]
    Closed,
}

/// The local audio/video stream could not be acquired.
///
/// Presence keeps working, but no media session can be hosted or joined
/// for the rest of the process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaCaptureError {
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("capture permission denied")]
    PermissionDenied,

    #[error("capture not supported: {0}")]
    Unsupported(String),
}

/// A single point-to-point session failed to establish or dropped.
///
/// Recovered by removing the entry; the next proximity sweep retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransientSessionError {
    #[error("call to {participant} failed: {reason}")]
    CallFailed { participant: String, reason: String },

    #[error("session with {participant} dropped")]
    Dropped { participant: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ProxmeshError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    MediaCapture(#[from] MediaCaptureError),

    #[error(transparent)]
    Session(#[from] TransientSessionError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
