//! Session lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{CreateSessionResponse, SessionSummary, TranscriptQuery, TranscriptResponse};

/// POST /api/sessions - Start an empty session
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session_id = state.sessions().create();
    tracing::info!("Session {}: created ({} live)", session_id, state.sessions().len());
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

/// GET /api/sessions/:id - Current state of a session
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>> {
    let session = state.sessions().lock(&id).await?;
    Ok(Json(SessionSummary::from(&*session)))
}

/// GET /api/sessions/:id/transcript - Messages exchanged so far
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<TranscriptQuery>,
) -> Result<Json<TranscriptResponse>> {
    let session = state.sessions().lock(&id).await?;
    Ok(Json(TranscriptResponse {
        session_id: id,
        order: query.order,
        turns: session.transcript_ordered(query.order),
    }))
}

/// DELETE /api/sessions/:id - End a session and drop its document
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let handle = state.sessions().remove(&id)?;
    // Wait for any in-flight request on this session to finish
    let mut session = handle.lock().await;
    state.manager().end(&mut session);
    Ok(StatusCode::NO_CONTENT)
}
