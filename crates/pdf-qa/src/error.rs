//! Error types for the question-answering pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The uploaded file is not a readable document, or has no pages/text
    #[error("Unreadable document: {0}")]
    UnreadableDocument(String),

    /// The uploaded file is not a PDF
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Chunk overlap must be smaller than the chunk size
    #[error("Invalid chunk configuration: overlap_chars ({overlap_chars}) must be smaller than max_chars ({max_chars})")]
    InvalidChunkConfig { max_chars: usize, overlap_chars: usize },

    /// Embedding model could not be reached or failed
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Vectors of different lengths were mixed
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Chunk and embedding counts differ
    #[error("Size mismatch: {chunks} chunks but {embeddings} embeddings")]
    SizeMismatch { chunks: usize, embeddings: usize },

    /// Language model call failed or timed out
    #[error("Answer synthesis unavailable: {0}")]
    SynthesisUnavailable(String),

    /// Unknown session
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    /// Malformed request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an unreadable document error
    pub fn unreadable(message: impl Into<String>) -> Self {
        Self::UnreadableDocument(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::EmbeddingUnavailable(message.into())
    }

    /// Create a synthesis error
    pub fn synthesis(message: impl Into<String>) -> Self {
        Self::SynthesisUnavailable(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Short machine-readable error kind, used in API bodies and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config_error",
            Error::UnreadableDocument(_) => "unreadable_document",
            Error::UnsupportedFileType(_) => "unsupported_type",
            Error::InvalidChunkConfig { .. } => "invalid_chunk_config",
            Error::EmbeddingUnavailable(_) => "embedding_unavailable",
            Error::DimensionMismatch { .. } => "dimension_mismatch",
            Error::SizeMismatch { .. } => "size_mismatch",
            Error::SynthesisUnavailable(_) => "synthesis_unavailable",
            Error::SessionNotFound(_) => "not_found",
            Error::InvalidRequest(_) => "invalid_request",
            Error::Internal(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Error::UnreadableDocument(_)
            | Error::UnsupportedFileType(_)
            | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Error::EmbeddingUnavailable(_) | Error::SynthesisUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Error::Config(_)
            | Error::InvalidChunkConfig { .. }
            | Error::DimensionMismatch { .. }
            | Error::SizeMismatch { .. }
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": {
                "type": self.kind(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
