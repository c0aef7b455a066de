//! Media sessions: local capture, the per-participant session manager, and
//! the transports it drives.

mod capture;
mod manager;
mod relay;
mod transport;
mod types;

#[cfg(test)]
mod tests;

pub use capture::{MediaCapture, StaticCapture};
pub use manager::PeerSessionManager;
pub use relay::RelayTransport;
pub use transport::{MediaTransport, StreamSink};
pub use types::{
    CaptureConstraints, InboundCall, LocalStream, MediaEvent, SessionState, StreamHandle,
};
