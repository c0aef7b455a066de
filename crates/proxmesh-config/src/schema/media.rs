use serde::{Deserialize, Serialize};

/// Local capture settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub audio: bool,
    pub video: bool,
    /// Label attached to the local stream descriptor.
    pub stream_label: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            audio: true,
            video: true,
            stream_label: "local".into(),
        }
    }
}
