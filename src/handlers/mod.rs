// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (token auth)

pub mod public;    // Tier 1: service info, health, token acquisition
pub mod protected; // Tier 2: needs, contents, autocomplete (/api/*)

pub use protected::*;
pub use public::*;
