// handlers/protected/autocomplete.rs - prefix lookups for the need form

use axum::extract::{rejection::QueryRejection, Query, State};
use serde::Deserialize;

use crate::api::format::{ConsultantList, ContactList, ContactMinimal, ConsultantMinimal, CustomerList, CustomerMinimal};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContactQuery {
    pub name: Option<String>,
    pub customer_id: Option<String>,
}

fn required_name(name: Option<String>) -> Result<String, ApiError> {
    name.filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("name can't be empty"))
}

/// GET /api/customers/?name=
pub async fn customers_get(
    State(state): State<AppState>,
    query: Result<Query<NameQuery>, QueryRejection>,
) -> Result<ApiResponse<CustomerList>, ApiError> {
    let Query(query) = query?;
    let name = required_name(query.name)?;

    let customers = state.customers.get_possible_customers(&name).await?;
    Ok(ApiResponse::success(CustomerList {
        customers: customers.iter().map(CustomerMinimal::from).collect(),
    }))
}

/// GET /api/contacts/?name=&customer_id=
pub async fn contacts_get(
    State(state): State<AppState>,
    query: Result<Query<ContactQuery>, QueryRejection>,
) -> Result<ApiResponse<ContactList>, ApiError> {
    let Query(query) = query?;
    let name = required_name(query.name)?;
    let customer = query.customer_id.as_deref().filter(|c| !c.is_empty());

    let contacts = state.customers.get_possible_contacts(&name, customer).await?;
    Ok(ApiResponse::success(ContactList {
        contacts: contacts.iter().map(ContactMinimal::from).collect(),
    }))
}

/// GET /api/consultants/?name=
pub async fn consultants_get(
    State(state): State<AppState>,
    query: Result<Query<NameQuery>, QueryRejection>,
) -> Result<ApiResponse<ConsultantList>, ApiError> {
    let Query(query) = query?;
    let name = required_name(query.name)?;

    let consultants = state.users.get_possible_consultants(&name).await?;
    Ok(ApiResponse::success(ConsultantList {
        consultants: consultants.iter().map(ConsultantMinimal::from).collect(),
    }))
}
