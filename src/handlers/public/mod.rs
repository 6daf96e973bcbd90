// handlers/public/mod.rs - Public handlers (no token required)
//
// Service info, health, and token acquisition with Basic credentials.

pub mod root;
pub mod token;

pub use root::{health, root};
pub use token::token_get;
