//! UserDeck: a user management REST API built on Axum and PostgreSQL.
//!
//! Registration and login issue JWT bearer tokens; authenticated users
//! manage their own profile, and admins get full CRUD over accounts with
//! pagination, search, sorting, and filtering.

pub mod cli;
pub mod config;
pub mod db;
pub mod docs;
pub mod logging;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;
pub mod validator;
