//! API routes for the PDF Q&A server

pub mod ask;
pub mod sessions;
pub mod upload;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};

use crate::generation::PROMPT_VERSION;
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route("/sessions", post(sessions::create_session))
        .route(
            "/sessions/:id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/sessions/:id/transcript", get(sessions::get_transcript))
        // Upload gets its own body limit
        .route(
            "/sessions/:id/upload",
            post(upload::upload_document).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/sessions/:id/ask", post(ask::ask_question))
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.config();
    let manager = state.manager();
    let llm = manager.synthesizer().llm();

    Json(serde_json::json!({
        "name": "pdf-qa",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Ask questions about an uploaded PDF; answers come only from its text",
        "embeddings": {
            "provider": manager.embedder().name(),
            "model": config.embeddings.model,
            "dimensions": manager.embedder().dimensions(),
        },
        "llm": {
            "provider": llm.name(),
            "model": llm.model(),
            "temperature": config.llm.temperature,
        },
        "retrieval": {
            "top_k": manager.top_k(),
            "chunk_max_chars": config.chunking.max_chars,
            "chunk_overlap_chars": config.chunking.overlap_chars,
            "prompt_template": PROMPT_VERSION,
        },
        "sessions": state.sessions().len(),
        "endpoints": {
            "POST /api/sessions": "Start a session",
            "GET /api/sessions/:id": "Session state",
            "DELETE /api/sessions/:id": "End a session",
            "POST /api/sessions/:id/upload": "Upload a PDF (multipart, one file)",
            "POST /api/sessions/:id/ask": "Ask a question",
            "GET /api/sessions/:id/transcript?order=oldest|newest": "Session transcript"
        }
    }))
}
