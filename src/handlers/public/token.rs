// handlers/public/token.rs - GET /api/token/ handler

use axum::{extract::State, http::HeaderMap};
use tracing::{info, warn};

use crate::api::format::TokenView;
use crate::auth::verify_password;
use crate::error::ApiError;
use crate::middleware::{parse_basic_credentials, ApiResponse};
use crate::state::AppState;

/// Exchange `Authorization: Basic base64(email:password)` for a signed token.
///
/// Unknown emails, users without a password and wrong passwords all answer
/// the same 401.
pub async fn token_get(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiResponse<TokenView>, ApiError> {
    let (email, password) = parse_basic_credentials(&headers).map_err(ApiError::unauthorized)?;

    let user = match state.users.get_user_by_email(&email).await? {
        Some(user) => user,
        None => {
            warn!(email = %email, "Token refused: unknown email");
            return Err(ApiError::unauthorized("Unauthorized access"));
        }
    };

    let Some(stored) = user.password_hash.clone() else {
        warn!(user_id = %user.id, "Token refused: user has no password");
        return Err(ApiError::unauthorized("Unauthorized access"));
    };

    // argon2 verification blocks for tens of milliseconds
    let valid = tokio::task::spawn_blocking(move || verify_password(&stored, &password))
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Credential check aborted: {}", e)))??;

    if !valid {
        warn!(user_id = %user.id, "Token refused: wrong password");
        return Err(ApiError::unauthorized("Unauthorized access"));
    }

    let token = state.issuer.issue(&user.id, None)?;
    info!(user_id = %user.id, "Token issued");

    Ok(ApiResponse::success(TokenView {
        token,
        expires_in: state.issuer.default_expiration(),
    }))
}
