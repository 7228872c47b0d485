use axum::{
    Router,
    routing::{get, put},
};

use crate::modules::users::controller::{
    change_password, delete_user, get_profile, get_user, list_users, update_profile, update_user,
};
use crate::state::AppState;

/// Self-service routes. Each handler authenticates through the
/// [`AuthUser`](crate::middleware::auth::AuthUser) extractor.
pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/change-password", put(change_password))
}

/// Admin CRUD routes. The caller applies the admin gate as a route layer so
/// the role check runs before any handler here.
pub fn init_admin_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
}
