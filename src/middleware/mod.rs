pub mod auth;
pub mod response;

pub use auth::{parse_basic_credentials, token_auth_middleware, CurrentUser};
pub use response::ApiResponse;
