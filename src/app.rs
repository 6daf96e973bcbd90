use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::ApiConfig;
use crate::handlers::{protected, public};
use crate::middleware::token_auth_middleware;
use crate::state::AppState;

/// Full application router over the given state
pub fn app(state: AppState) -> Router {
    let api = &state.config.api;

    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(token_routes())
        // Protected
        .merge(
            Router::new()
                .merge(need_routes())
                .merge(content_routes())
                .merge(autocomplete_routes())
                .route_layer(from_fn_with_state(state.clone(), token_auth_middleware)),
        )
        .layer(DefaultBodyLimit::max(state.config.uploads.max_upload_bytes));

    if api.enable_cors {
        router = router.layer(cors_layer(api));
    }
    if api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn token_routes() -> Router<AppState> {
    Router::new()
        .route("/api/token", get(public::token_get))
        .route("/api/token/", get(public::token_get))
}

fn need_routes() -> Router<AppState> {
    use protected::needs;

    Router::new()
        // Collection
        .route("/api/needs", get(needs::needs_get).post(needs::needs_post))
        .route("/api/needs/", get(needs::needs_get).post(needs::needs_post))
        // Item
        .route(
            "/api/needs/:need_id",
            get(needs::need_get).put(needs::need_put).delete(needs::need_delete),
        )
}

fn content_routes() -> Router<AppState> {
    use axum::routing::post;
    use protected::contents;

    Router::new()
        .route("/api/needs/:need_id/contents", post(contents::contents_post))
        .route("/api/needs/:need_id/contents/", post(contents::contents_post))
        .route(
            "/api/needs/:need_id/contents/:content_id",
            get(contents::content_get).delete(contents::content_delete),
        )
}

fn autocomplete_routes() -> Router<AppState> {
    use protected::autocomplete;

    Router::new()
        .route("/api/customers", get(autocomplete::customers_get))
        .route("/api/customers/", get(autocomplete::customers_get))
        .route("/api/contacts", get(autocomplete::contacts_get))
        .route("/api/contacts/", get(autocomplete::contacts_get))
        .route("/api/consultants", get(autocomplete::consultants_get))
        .route("/api/consultants/", get(autocomplete::consultants_get))
}

fn cors_layer(api: &ApiConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = api
        .cors_origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
