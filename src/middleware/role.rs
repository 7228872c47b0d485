//! Role and ownership gates, composable on top of the authentication chain.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::middleware::auth::AuthUser;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Middleware that authenticates the request and requires one of
/// `allowed_roles`. The loaded principal is cached in request extensions so
/// handler extractors reuse it instead of re-querying the store.
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: Vec<UserRole>,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;

    if !allowed_roles.contains(&auth_user.0.role) {
        return Err(AppError::forbidden("Admin access required"));
    }

    parts.extensions.insert(auth_user);
    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// Gate for admin-only routes.
///
/// ```rust,ignore
/// router.route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
/// ```
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, vec![UserRole::Admin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Ownership gate: the principal may act on a resource when it holds the
/// admin role or owns the resource.
pub fn check_ownership(auth_user: &AuthUser, owner_id: i64) -> Result<(), AppError> {
    if auth_user.is_admin() || auth_user.id() == owner_id {
        Ok(())
    } else {
        Err(AppError::forbidden("Access denied"))
    }
}
