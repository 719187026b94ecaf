//! Question endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use std::time::Instant;
use uuid::Uuid;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{AskRequest, AskResponse};

/// POST /api/sessions/:id/ask - Ask a question about the session's document
///
/// Provider failures are reported in the body with `failed: true`, not as
/// HTTP errors, because they are recorded in the transcript like any reply.
pub async fn ask_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>> {
    let start = Instant::now();
    let mut session = state.sessions().lock(&id).await?;
    let outcome = state.manager().ask(&mut session, &request.question).await;

    Ok(Json(AskResponse::from_outcome(
        outcome,
        start.elapsed().as_millis() as u64,
    )))
}
