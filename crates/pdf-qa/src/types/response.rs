//! Response types for the HTTP surface

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::query::TranscriptOrder;
use super::transcript::Turn;
use crate::session::{AskOutcome, Session, SessionState, UploadSummary};

/// Returned when a session is created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

/// Result of a successful upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub session_id: Uuid,
    pub document_id: Uuid,
    pub filename: String,
    pub content_hash: String,
    pub pages: usize,
    pub chunks: usize,
    pub dimensions: usize,
    /// User-visible status line
    pub message: String,
    pub processing_time_ms: u64,
}

impl UploadResponse {
    pub fn new(session_id: Uuid, summary: UploadSummary, processing_time_ms: u64) -> Self {
        Self {
            session_id,
            document_id: summary.document_id,
            filename: summary.filename,
            content_hash: summary.content_hash,
            pages: summary.pages,
            chunks: summary.chunks,
            dimensions: summary.dimensions,
            message: summary.message,
            processing_time_ms,
        }
    }
}

/// Result of asking a question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    /// Bot reply; absent when the question was ignored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// True when the input was empty and nothing happened
    pub ignored: bool,
    /// True when the reply is an error message rather than an answer
    pub failed: bool,
    pub processing_time_ms: u64,
}

impl AskResponse {
    pub fn from_outcome(outcome: AskOutcome, processing_time_ms: u64) -> Self {
        let (answer, ignored, failed) = match outcome {
            AskOutcome::Ignored => (None, true, false),
            AskOutcome::NoDocument(message) => (Some(message), false, false),
            AskOutcome::Answered(answer) => (Some(answer), false, false),
            AskOutcome::Failed(message) => (Some(message), false, true),
        };
        Self {
            answer,
            ignored,
            failed,
            processing_time_ms,
        }
    }
}

/// Snapshot of a session's state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    pub pages: usize,
    pub chunks: usize,
    pub transcript_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_activity: chrono::DateTime<chrono::Utc>,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        let active = session.active();
        Self {
            session_id: session.id(),
            state: session.state(),
            filename: active.map(|a| a.document.filename.clone()),
            content_hash: active.map(|a| a.document.content_hash.clone()),
            pages: active.map(|a| a.document.page_count()).unwrap_or(0),
            chunks: active.map(|a| a.index.len()).unwrap_or(0),
            transcript_len: session.transcript().len(),
            last_error: session.last_error().map(str::to_string),
            created_at: session.created_at(),
            last_activity: session.last_activity(),
        }
    }
}

/// Session transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub session_id: Uuid,
    pub order: TranscriptOrder,
    pub turns: Vec<Turn>,
}
