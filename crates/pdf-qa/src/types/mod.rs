//! Core types for the question-answering pipeline

pub mod document;
pub mod query;
pub mod response;
pub mod transcript;

pub use document::{Chunk, Document, Page};
pub use query::{AskRequest, TranscriptOrder, TranscriptQuery};
pub use response::{
    AskResponse, CreateSessionResponse, SessionSummary, TranscriptResponse, UploadResponse,
};
pub use transcript::{Speaker, Turn};
