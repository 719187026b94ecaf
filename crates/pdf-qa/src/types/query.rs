//! Request types for the HTTP surface

use serde::{Deserialize, Serialize};

/// Ask a question about the session's document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    /// Free-text question; empty or whitespace-only input is ignored
    #[serde(default)]
    pub question: String,
}

/// Transcript ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptOrder {
    /// Chronological
    #[default]
    Oldest,
    /// Most recent first, as chat views display it
    Newest,
}

/// Query string for transcript reads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptQuery {
    #[serde(default)]
    pub order: TranscriptOrder,
}
