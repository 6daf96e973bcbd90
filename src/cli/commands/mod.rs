pub mod auth;
pub mod fixture;
