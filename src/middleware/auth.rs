use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::modules::users::model::{User, UserRole, UserStatus};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_token;

/// The authenticated request principal.
///
/// Extraction walks the full chain: bearer header, token verification, a
/// live load of the user row, and the inactive-account check. Loading the
/// row on every request means a role or status change takes effect on the
/// very next request even though the outstanding token is unchanged.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }

    pub fn is_admin(&self) -> bool {
        self.0.role == UserRole::Admin
    }
}

pub(crate) async fn authenticate(
    parts: &mut Parts,
    state: &AppState,
) -> Result<AuthUser, AppError> {
    // An outer role gate may have already run the chain for this request.
    if let Some(cached) = parts.extensions.get::<AuthUser>() {
        return Ok(cached.clone());
    }

    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Access token required"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized("Access token required"))?;

    let claims = verify_token(token, &state.jwt_config)?;

    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::unauthorized("Invalid token"))?;

    // A valid token whose subject row is gone rejects 401, not 404: a 404
    // here would disclose whether the account ever existed.
    let user = UserService::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid token"))?;

    if user.status == UserStatus::Inactive {
        return Err(AppError::forbidden("User account is inactive"));
    }

    Ok(AuthUser(user))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await
    }
}

/// Optional authentication: runs the same chain but swallows every failure,
/// so anonymous callers proceed without a principal. Used by endpoints that
/// merely behave differently for authenticated callers.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<User>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(
            authenticate(parts, state).await.ok().map(|auth| auth.0),
        ))
    }
}
