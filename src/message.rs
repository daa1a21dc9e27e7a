//! Cross-document message contract between the host page and the frame

use serde::{Deserialize, Serialize};

/// Structured message exchanged with the embedded document
///
/// Serialized as `{ "type": "toggleFullscreen", "id": ... }` and
/// `{ "type": "fullscreenState", "id": ..., "isFullscreen": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FrameMessage {
    /// Frame → host: flip the fullscreen state of embed `id`
    ToggleFullscreen {
        /// Embed identifier
        id: String,
    },
    /// Host → frame: the fullscreen state after a transition
    #[serde(rename_all = "camelCase")]
    FullscreenState {
        /// Embed identifier
        id: String,
        /// New state
        is_fullscreen: bool,
    },
}

impl FrameMessage {
    /// Identifier the message is scoped to
    pub fn id(&self) -> &str {
        match self {
            Self::ToggleFullscreen { id } | Self::FullscreenState { id, .. } => id,
        }
    }

    /// Decode a message received from the shared channel
    ///
    /// Anything that is not one of ours is an error; callers treat that as
    /// unrelated page traffic.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Encode for posting into the frame
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
