// handlers/protected/needs/item.rs - GET/PUT/DELETE /api/needs/:need_id

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;

use super::utils::{check_consultants, load_owned_need, need_complete, FieldErrors, MAX_CONSULTANTS};
use crate::api::format::NeedComplete;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, CurrentUser};
use crate::services::NeedPatch;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NeedPut {
    pub title: Option<String>,
    pub description: Option<String>,
    pub success_keys: Option<Vec<String>>,
    pub start_at_latest: Option<String>,
    pub month_duration: Option<f64>,
    pub week_frequency: Option<f64>,
    pub rate: Option<f64>,
    pub consultants: Option<Vec<String>>,
    pub status: Option<String>,
}

/// GET /api/needs/:need_id - need with customer, contact and consultants
pub async fn get(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(need_id): Path<String>,
) -> Result<ApiResponse<NeedComplete>, ApiError> {
    let need = load_owned_need(&state, &need_id, &user).await?;
    Ok(ApiResponse::success(need_complete(&state, &need).await?))
}

/// PUT /api/needs/:need_id - partial update; absent fields are left alone
pub async fn put(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(need_id): Path<String>,
    payload: Result<Json<NeedPut>, JsonRejection>,
) -> Result<ApiResponse<()>, ApiError> {
    let need = load_owned_need(&state, &need_id, &user).await?;
    let Json(body) = payload?;

    let mut errors = FieldErrors::default();
    errors.text_length("title", body.title.as_deref().filter(|t| !t.is_empty()), 3, 64);
    let status = errors.status(body.status.as_deref().filter(|s| !s.is_empty()));
    errors.success_keys(body.success_keys.as_deref());
    errors.max_items("consultants", body.consultants.as_deref(), MAX_CONSULTANTS);
    errors.non_negative("month_duration", body.month_duration);
    errors.non_negative("week_frequency", body.week_frequency);
    errors.non_negative("rate", body.rate);
    errors.iso_datetime("start_at_latest", body.start_at_latest.as_deref());
    errors.into_result()?;

    if let Some(consultants) = &body.consultants {
        check_consultants(&state, consultants).await?;
    }

    let patch = NeedPatch {
        title: body.title,
        description: body.description,
        success_keys: body.success_keys,
        start_at_latest: body.start_at_latest,
        month_duration: body.month_duration,
        week_frequency: body.week_frequency,
        rate: body.rate,
        consultants: body.consultants,
        status,
    };

    if !state.needs.update_need(&need.id, &patch).await? {
        return Err(ApiError::bad_request("Unable to update need."));
    }
    info!(need_id = %need.id, "Need updated");
    Ok(ApiResponse::no_content())
}

/// DELETE /api/needs/:need_id
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(need_id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let need = load_owned_need(&state, &need_id, &user).await?;

    if !state.needs.delete_need(&need.id).await? {
        return Err(ApiError::bad_request(format!("Unable to delete need #{}", need.id)));
    }
    info!(need_id = %need.id, "Need deleted");
    Ok(ApiResponse::no_content())
}
