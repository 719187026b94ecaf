//! Transcript entries

use serde::{Deserialize, Serialize};

/// Who produced a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

/// One message in a session transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub message: String,
    pub at: chrono::DateTime<chrono::Utc>,
}

impl Turn {
    pub fn user(message: impl Into<String>) -> Self {
        Self::new(Speaker::User, message)
    }

    pub fn bot(message: impl Into<String>) -> Self {
        Self::new(Speaker::Bot, message)
    }

    fn new(speaker: Speaker, message: impl Into<String>) -> Self {
        Self {
            speaker,
            message: message.into(),
            at: chrono::Utc::now(),
        }
    }
}
