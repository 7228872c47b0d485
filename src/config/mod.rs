//! Application configuration, loaded from environment variables.
//!
//! Each submodule owns one concern and exposes a `from_env()` constructor.
//! Everything is read once at startup and carried in
//! [`crate::state::AppState`]; nothing is re-read per request.

pub mod cors;
pub mod database;
pub mod jwt;
pub mod rate_limit;
pub mod security;
