//! Document upload endpoint

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::time::Instant;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::UploadResponse;

/// A file part read from the multipart body
struct UploadedFile {
    filename: String,
    content_type: Option<String>,
    data: Vec<u8>,
}

/// POST /api/sessions/:id/upload - Replace the session's document
pub async fn upload_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let start = Instant::now();
    state.sessions().get(&id)?;
    let file = read_single_file(multipart).await?;

    tracing::info!(
        "Session {}: processing upload {} ({} bytes)",
        id,
        file.filename,
        file.data.len()
    );

    let mut session = state.sessions().lock(&id).await?;
    let summary = state
        .manager()
        .upload(
            &mut session,
            &file.filename,
            file.content_type.as_deref(),
            file.data,
        )
        .await?;

    Ok(Json(UploadResponse::new(
        id,
        summary,
        start.elapsed().as_millis() as u64,
    )))
}

/// Read the multipart body, which must carry exactly one file
async fn read_single_file(mut multipart: Multipart) -> Result<UploadedFile> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        if file.is_some() {
            return Err(Error::InvalidRequest(
                "exactly one file may be uploaded".to_string(),
            ));
        }

        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidRequest(format!("Failed to read file: {}", e)))?;

        file = Some(UploadedFile {
            filename,
            content_type,
            data: data.to_vec(),
        });
    }

    file.ok_or_else(|| Error::InvalidRequest("no file in upload".to_string()))
}
