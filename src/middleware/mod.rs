//! Request guards.
//!
//! Authentication is an extractor chain ([`auth::AuthUser`]); authorization
//! is layered on top as role and ownership gates ([`role`]). Each guard
//! either lets the request continue or produces a terminal error response.
//!
//! Per protected request the chain is:
//!
//! 1. Bearer token extracted from `Authorization` (missing: 401)
//! 2. Token verified (invalid/expired: 401)
//! 3. User row loaded by subject id (missing: 401)
//! 4. Inactive account rejected (403)
//! 5. Principal attached; role/ownership gates run where configured (403)

pub mod auth;
pub mod role;
