use chrono::{DateTime, NaiveDate, NaiveDateTime};
use futures::future::try_join_all;
use std::collections::BTreeMap;

use crate::api::format::{NeedComplete, NeedMinimal};
use crate::database::models::{Need, NeedStatus, User};
use crate::error::ApiError;
use crate::state::AppState;

pub const MAX_SUCCESS_KEYS: usize = 3;
pub const MAX_CONSULTANTS: usize = 5;

/// Load a need the current user authored; anything else is a 404
pub async fn load_owned_need(state: &AppState, need_id: &str, user: &User) -> Result<Need, ApiError> {
    match state.needs.get_need_by_id(need_id).await? {
        Some(need) if need.author == user.id => Ok(need),
        _ => Err(ApiError::not_found("Need not found")),
    }
}

pub async fn need_minimal(state: &AppState, need: &Need) -> Result<NeedMinimal, ApiError> {
    let (customer, contact) = tokio::try_join!(
        state.customers.get_customer_by_id(&need.customer),
        state.customers.get_contact_by_id(&need.contact),
    )?;
    Ok(NeedMinimal::new(need, customer.as_ref(), contact.as_ref()))
}

pub async fn need_complete(state: &AppState, need: &Need) -> Result<NeedComplete, ApiError> {
    let minimal = need_minimal(state, need).await?;
    let consultants = try_join_all(need.consultants.iter().map(|id| state.users.get_consultant_by_id(id))).await?;
    let consultants: Vec<User> = consultants.into_iter().flatten().collect();
    Ok(NeedComplete::new(need, minimal, &consultants))
}

/// Ensure every consultant id names a user with the consultant role
pub async fn check_consultants(state: &AppState, consultants: &[String]) -> Result<(), ApiError> {
    let found = try_join_all(consultants.iter().map(|id| state.users.get_consultant_by_id(id))).await?;
    if found.iter().any(Option::is_none) {
        return Err(ApiError::bad_request("Consultant not found"));
    }
    Ok(())
}

/// Field-level checks collected before any store call. The first failure
/// becomes the error message.
#[derive(Debug, Default)]
pub struct FieldErrors {
    first: Option<String>,
    fields: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        if self.first.is_none() {
            self.first = Some(message.clone());
        }
        self.fields.entry(field.to_string()).or_insert(message);
    }

    pub fn require_text(&mut self, field: &str, value: Option<&str>) {
        if value.map_or(true, |v| v.trim().is_empty()) {
            self.add(field, format!("{} is required", field));
        }
    }

    pub fn text_length(&mut self, field: &str, value: Option<&str>, min: usize, max: usize) {
        if let Some(v) = value {
            let len = v.chars().count();
            if len < min || len > max {
                self.add(field, format!("{} must be between {} and {} characters", field, min, max));
            }
        }
    }

    pub fn status(&mut self, value: Option<&str>) -> Option<NeedStatus> {
        let raw = value?;
        match raw.parse() {
            Ok(status) => Some(status),
            Err(_) => {
                self.add("status", "Invalid status choice");
                None
            }
        }
    }

    pub fn non_negative(&mut self, field: &str, value: Option<f64>) {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                self.add(field, format!("{} must be a positive number", field));
            }
        }
    }

    pub fn max_items(&mut self, field: &str, items: Option<&[String]>, max: usize) {
        if let Some(items) = items {
            if items.len() > max {
                self.add(field, format!("{} accepts at most {} items", field, max));
            }
        }
    }

    pub fn success_keys(&mut self, keys: Option<&[String]>) {
        self.max_items("success_keys", keys, MAX_SUCCESS_KEYS);
        if keys.map_or(false, |keys| keys.iter().any(|k| k.chars().count() < 3)) {
            self.add("success_keys", "success_keys entries need at least 3 characters");
        }
    }

    pub fn iso_datetime(&mut self, field: &str, value: Option<&str>) {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            if !is_iso8601(v) {
                self.add(field, format!("{} must be an ISO-8601 date", field));
            }
        }
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        match self.first {
            None => Ok(()),
            Some(message) => Err(ApiError::validation_error(message, Some(self.fields))),
        }
    }
}

pub fn is_iso8601(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}
