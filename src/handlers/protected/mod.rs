// handlers/protected/mod.rs - Protected handlers (token required)
//
// Every route here sits behind token_auth_middleware, which places the
// caller in request extensions as CurrentUser.
//
// Route Prefix: /api/needs/*, /api/customers/, /api/contacts/, /api/consultants/

pub mod autocomplete;
pub mod contents;
pub mod needs;

pub use autocomplete::{consultants_get, contacts_get, customers_get};
pub use contents::{content_delete, content_get, contents_post};
pub use needs::{need_delete, need_get, need_put, needs_get, needs_post};
