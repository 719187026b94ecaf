//! Per-session state: the active document and the transcript

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::retrieval::VectorIndex;
use crate::types::{Document, TranscriptOrder, Turn};

/// Whether a session can answer questions yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No document uploaded yet
    NoDocument,
    /// A document is indexed and questions are answered against it
    Ready,
}

/// The document a session answers from, with its index
#[derive(Debug)]
pub struct ActiveDocument {
    pub document: Document,
    pub index: VectorIndex,
}

/// One user's conversation with one document
///
/// The active document is only ever replaced as a whole. The transcript is
/// append-only until the session ends.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    active: Option<ActiveDocument>,
    transcript: Vec<Turn>,
    last_error: Option<String>,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            active: None,
            transcript: Vec::new(),
            last_error: None,
            created_at: now,
            last_activity: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        if self.active.is_some() {
            SessionState::Ready
        } else {
            SessionState::NoDocument
        }
    }

    pub fn active(&self) -> Option<&ActiveDocument> {
        self.active.as_ref()
    }

    /// Transcript, oldest first
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Transcript in the requested order
    pub fn transcript_ordered(&self, order: TranscriptOrder) -> Vec<Turn> {
        match order {
            TranscriptOrder::Oldest => self.transcript.clone(),
            TranscriptOrder::Newest => self.transcript.iter().rev().cloned().collect(),
        }
    }

    /// Message of the most recent failed upload, cleared by the next success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// How long the session has been idle at `now`
    pub fn idle_for(&self, now: DateTime<Utc>) -> std::time::Duration {
        (now - self.last_activity).to_std().unwrap_or_default()
    }

    /// Drop the document, transcript and error
    pub fn end(&mut self) {
        self.active = None;
        self.transcript.clear();
        self.last_error = None;
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub(crate) fn install(&mut self, active: ActiveDocument) {
        self.active = Some(active);
        self.last_error = None;
    }

    pub(crate) fn record_error(&mut self, message: String) {
        self.last_error = Some(message);
    }

    pub(crate) fn push(&mut self, turn: Turn) {
        self.transcript.push(turn);
    }
}
