//! Sessions: one active document, its index and a transcript per user

mod manager;
mod state;
mod store;

pub use manager::{AskOutcome, SessionManager, UploadSummary, NO_DOCUMENT_MESSAGE};
pub use state::{ActiveDocument, Session, SessionState};
pub use store::{SessionHandle, SessionStore};
