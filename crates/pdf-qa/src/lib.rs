//! pdf-qa: question answering over a single uploaded PDF
//!
//! A document is extracted page by page, split into overlapping chunks, embedded and
//! held in a session-scoped in-memory index. Questions are embedded, matched against
//! that index, and answered by a language model that is only shown the retrieved text.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod session;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use session::{AskOutcome, Session, SessionManager, SessionState, SessionStore};
pub use types::{
    document::{Chunk, Document, Page},
    transcript::{Speaker, Turn},
};
