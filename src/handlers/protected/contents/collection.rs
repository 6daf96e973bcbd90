// handlers/protected/contents/collection.rs - POST /api/needs/:need_id/contents

use axum::extract::{multipart::MultipartRejection, Multipart, Path, State};
use axum::Extension;
use std::io::ErrorKind;
use std::path::Path as FsPath;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

use super::sanitize_filename;
use crate::api::format::NeedContentView;
use crate::error::ApiError;
use crate::handlers::protected::needs::utils::load_owned_need;
use crate::middleware::{ApiResponse, CurrentUser};
use crate::state::AppState;

const FILE_FIELD: &str = "file";

/// Upload one attachment in the multipart field `file`.
pub async fn post(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(need_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<NeedContentView>, ApiError> {
    let need = load_owned_need(&state, &need_id, &user).await?;
    let mut multipart = multipart?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().map(sanitize_filename).unwrap_or_default();
        let bytes = field.bytes().await?;
        upload = Some((filename, bytes));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(ApiError::bad_request("No file part"));
    };
    if filename.is_empty() {
        return Err(ApiError::bad_request("No selected file"));
    }

    let uploads = &state.config.uploads;
    if !uploads.is_allowed(&filename) {
        warn!(filename = %filename, "Upload refused: extension not allowed");
        return Err(ApiError::bad_request("File not allowed"));
    }

    tokio::fs::create_dir_all(&uploads.folder)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Upload folder unavailable: {}", e)))?;
    let path = uploads.folder.join(&filename);
    write_new_file(&path, &bytes).await.map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => ApiError::conflict(format!("File {} already exist", filename)),
        _ => ApiError::internal_server_error(format!("Unable to write file: {}", e)),
    })?;

    let content = match state.needs.create_need_content(&need.id, &filename).await {
        Ok(Some(content)) => content,
        Ok(None) => {
            remove_quietly(&path).await;
            return Err(ApiError::bad_request("Unable to save content"));
        }
        Err(e) => {
            remove_quietly(&path).await;
            return Err(e.into());
        }
    };

    info!(need_id = %need.id, content_id = %content.id, filename = %filename, "Content uploaded");
    Ok(ApiResponse::created(NeedContentView::from(&content)))
}

async fn write_new_file(path: &FsPath, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    if let Err(e) = file.write_all(bytes).await {
        drop(file);
        remove_quietly(path).await;
        return Err(e);
    }
    file.flush().await
}

async fn remove_quietly(path: &FsPath) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        error!(path = %path.display(), "Failed to remove uploaded file: {}", e);
    }
}
