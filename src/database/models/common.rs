//! Shared model types.

use serde::{Deserialize, Serialize};

/// An inline URL button attached to a welcome message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub url: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

/// Kind of media attached to a welcome message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
    Animation,
}

/// Media reference for the welcome message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WelcomeMedia {
    pub kind: MediaKind,
    /// Telegram file id.
    pub file_id: String,
}
