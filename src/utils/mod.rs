//! Shared utilities.
//!
//! - [`errors`]: Application error types and HTTP mapping
//! - [`jwt`]: Token creation and verification
//! - [`pagination`]: Request pagination resolver and response envelope
//! - [`password`]: bcrypt hashing and verification
//! - [`response`]: Success response envelope

pub mod errors;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod response;
