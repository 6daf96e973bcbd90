// handlers/protected/contents/item.rs - GET/DELETE /api/needs/:need_id/contents/:content_id

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Extension,
};
use std::io::ErrorKind;
use tracing::{info, warn};

use crate::database::models::NeedContent;
use crate::error::ApiError;
use crate::handlers::protected::needs::utils::load_owned_need;
use crate::middleware::{ApiResponse, CurrentUser};
use crate::state::AppState;

async fn load_content(state: &AppState, need_id: &str, content_id: &str) -> Result<NeedContent, ApiError> {
    match state.needs.get_need_content_by_id(content_id).await? {
        Some(content) if content.need == need_id => Ok(content),
        _ => Err(ApiError::not_found("Content not found")),
    }
}

pub fn content_type_for(filename: &str) -> &'static str {
    let ext = filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// GET - the attachment bytes. A record whose file vanished is dropped.
pub async fn get(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((need_id, content_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let need = load_owned_need(&state, &need_id, &user).await?;
    let content = load_content(&state, &need.id, &content_id).await?;

    let path = state.config.uploads.folder.join(&content.filename);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(content_id = %content.id, path = %path.display(), "Content file missing, dropping record");
            state.needs.delete_need_content(&content.id).await?;
            return Err(ApiError::bad_request("Need have no content"));
        }
        Err(e) => return Err(ApiError::internal_server_error(format!("Unable to read file: {}", e))),
    };

    let disposition = format!("inline; filename=\"{}\"", content.filename.replace('"', ""));
    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&content.filename).to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// DELETE - remove the file when present, then the record
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((need_id, content_id)): Path<(String, String)>,
) -> Result<ApiResponse<()>, ApiError> {
    let need = load_owned_need(&state, &need_id, &user).await?;
    let content = load_content(&state, &need.id, &content_id).await?;

    let path = state.config.uploads.folder.join(&content.filename);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(ApiError::internal_server_error(format!("Unable to remove file: {}", e))),
    }

    if !state.needs.delete_need_content(&content.id).await? {
        return Err(ApiError::bad_request(format!("Unable to delete content #{}", content.id)));
    }
    info!(need_id = %need.id, content_id = %content.id, "Content deleted");
    Ok(ApiResponse::no_content())
}
