use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::warn;

use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// User resolved from the request token
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Token authentication middleware: verifies the token, loads its user and
/// injects it as [`CurrentUser`].
pub async fn token_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers()).map_err(ApiError::unauthorized)?;
    let user_id = state.issuer.verify(&token)?;

    let user = state.users.get_user_by_id(&user_id).await?.ok_or_else(|| {
        warn!(user_id = %user_id, "Token references an unknown user");
        ApiError::unauthorized("Unauthorized access")
    })?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Token <t>` (or `Bearer <t>`)
fn extract_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_str = authorization(headers)?;

    let token = auth_str
        .strip_prefix("Token ")
        .or_else(|| auth_str.strip_prefix("Bearer "))
        .ok_or_else(|| "Authorization header must use Token format".to_string())?
        .trim();

    if token.is_empty() {
        return Err("Empty token".to_string());
    }
    Ok(token.to_string())
}

/// Decode `Authorization: Basic base64(email:password)`
pub fn parse_basic_credentials(headers: &HeaderMap) -> Result<(String, String), String> {
    let auth_str = authorization(headers)?;
    let encoded = auth_str
        .strip_prefix("Basic ")
        .ok_or_else(|| "Authorization header must use Basic format".to_string())?;

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| "Invalid Basic credentials encoding".to_string())?;
    let decoded = String::from_utf8(decoded).map_err(|_| "Invalid Basic credentials encoding".to_string())?;

    let (email, password) = decoded
        .split_once(':')
        .ok_or_else(|| "Basic credentials must be email:password".to_string())?;
    Ok((email.to_string(), password.to_string()))
}

fn authorization(headers: &HeaderMap) -> Result<&str, String> {
    headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())
}
