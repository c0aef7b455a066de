pub mod errors;
pub mod id;
pub mod position;

pub use errors::{
    ConfigError, ConnectionError, MediaCaptureError, ProxmeshError, TransientSessionError,
};
pub use id::{new_call_id, new_id, CallId, ParticipantId};
pub use position::Position;

pub type Result<T> = std::result::Result<T, ProxmeshError>;
