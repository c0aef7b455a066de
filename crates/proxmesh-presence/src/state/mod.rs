//! Remote state client: joins the room and turns its diff feed into
//! typed, ordered [`RemoteEvent`]s.

mod client;
mod translator;
mod types;


pub use client::RemoteStateClient;
pub use types::{FieldChange, LocalState, ParticipantRecord, RemoteEvent, WatchedField};
