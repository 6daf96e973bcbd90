// handlers/protected/needs/collection.rs - GET/POST /api/needs/

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Extension, Json,
};
use futures::future::try_join_all;
use serde::Deserialize;
use tracing::info;

use super::utils::{check_consultants, need_minimal, FieldErrors, MAX_CONSULTANTS};
use crate::api::format::{NeedList, NeedMinimal};
use crate::error::ApiError;
use crate::filter::Pagination;
use crate::middleware::{ApiResponse, CurrentUser};
use crate::services::{NeedFilter, NewNeed};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NeedListQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub customer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NeedPost {
    pub created_at: Option<String>,
    pub customer: Option<String>,
    pub contact: Option<String>,
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

/// GET /api/needs/ - the current user's needs, filtered and paginated
pub async fn get(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    query: Result<Query<NeedListQuery>, QueryRejection>,
) -> Result<ApiResponse<NeedList>, ApiError> {
    let Query(query) = query?;

    let mut errors = FieldErrors::default();
    let status = errors.status(query.status.as_deref().filter(|s| !s.is_empty()));
    let pagination = Pagination::new(query.page, query.size);
    if pagination.exceeds_result_window() {
        errors.add(
            "page",
            format!("page * size + size must not exceed {}", Pagination::MAX_RESULT_WINDOW),
        );
    }
    errors.into_result()?;

    let filter = NeedFilter {
        author: Some(user.id.clone()),
        title: query.title,
        status,
        customer: query.customer,
    };
    let needs = state
        .needs
        .get_needs(&filter, pagination)
        .await?;

    let needs = try_join_all(needs.iter().map(|need| need_minimal(&state, need))).await?;
    Ok(ApiResponse::success(NeedList { needs }))
}

/// POST /api/needs/ - create a need authored by the current user
pub async fn post(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<NeedPost>, JsonRejection>,
) -> Result<ApiResponse<NeedMinimal>, ApiError> {
    let Json(body) = payload?;

    let mut errors = FieldErrors::default();
    errors.require_text("title", body.title.as_deref());
    errors.text_length("title", body.title.as_deref(), 3, 64);
    errors.require_text("customer", body.customer.as_deref());
    errors.require_text("contact", body.contact.as_deref());
    errors.require_text("description", body.description.as_deref());
    errors.require_text("status", body.status.as_deref());
    let status = errors.status(body.status.as_deref().filter(|s| !s.is_empty()));
    errors.success_keys(body.success_keys.as_deref());
    errors.max_items("consultants", body.consultants.as_deref(), MAX_CONSULTANTS);
    errors.non_negative("month_duration", body.month_duration);
    errors.non_negative("week_frequency", body.week_frequency);
    errors.non_negative("rate", body.rate);
    errors.iso_datetime("created_at", body.created_at.as_deref());
    errors.iso_datetime("start_at_latest", body.start_at_latest.as_deref());
    errors.into_result()?;

    // into_result guarantees these are present
    let (Some(customer), Some(contact), Some(title), Some(status)) = (body.customer, body.contact, body.title, status)
    else {
        return Err(ApiError::bad_request("Missing required fields"));
    };

    if state.customers.get_customer_by_id(&customer).await?.is_none() {
        return Err(ApiError::bad_request("Customer not found"));
    }
    if state.customers.get_contact_by_id(&contact).await?.is_none() {
        return Err(ApiError::bad_request("Contact not found"));
    }
    let consultants = body.consultants.unwrap_or_default();
    check_consultants(&state, &consultants).await?;

    let created_at = body
        .created_at
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string());

    let new_need = NewNeed {
        author: user.id.clone(),
        title,
        created_at,
        start_at_latest: body.start_at_latest,
        customer,
        contact,
        description: body.description,
        success_keys: body.success_keys.unwrap_or_default(),
        month_duration: body.month_duration,
        week_frequency: body.week_frequency,
        rate: body.rate,
        consultants,
        status,
    };

    let need = state
        .needs
        .create_need(&new_need)
        .await?
        .ok_or_else(|| ApiError::bad_request("Error during save need"))?;
    info!(need_id = %need.id, author = %user.id, "Need created");

    Ok(ApiResponse::created(need_minimal(&state, &need).await?))
}
