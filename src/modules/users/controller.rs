use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use tracing::instrument;

use super::model::{AdminUpdateUserDto, ChangePasswordDto, UpdateProfileDto, User};
use super::service::UserService;
use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::{
    FilterRule, FilterType, Paginated, PaginationConfig, PaginationParams, SortConfig, SortOrder,
};
use crate::utils::response::{ApiResponse, message, success};
use crate::validator::ValidatedJson;

/// Listing rules for the admin user index: small default page, hard cap,
/// an allow-listed sort surface, and two enum filters.
const USERS_LIST: PaginationConfig = PaginationConfig {
    default_limit: 10,
    max_limit: 50,
    sort: Some(SortConfig {
        allowed: &["id", "username", "email", "created_at"],
        default_sort: "created_at",
        default_order: SortOrder::Desc,
    }),
    filters: &[
        (
            "role",
            FilterRule {
                kind: FilterType::Text,
                allowed_values: Some(&["user", "admin"]),
            },
        ),
        (
            "status",
            FilterRule {
                kind: FilterType::Text,
                allowed_values: Some(&["active", "inactive"]),
            },
        ),
    ],
};

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/users/profile",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<User>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Account is inactive", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all, fields(user_id = auth_user.id()))]
pub async fn get_profile(auth_user: AuthUser) -> Json<ApiResponse<User>> {
    success("Profile retrieved successfully", auth_user.0)
}

/// Update the authenticated user's profile
#[utoipa::path(
    put,
    path = "/api/users/profile",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated successfully", body = ApiResponse<User>),
        (status = 400, description = "Validation error or no fields to update", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 409, description = "Username or email already exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all, fields(user_id = auth_user.id()))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateProfileDto>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = UserService::update_profile(&state.db, auth_user.id(), dto).await?;
    Ok(success("Profile updated successfully", user))
}

/// Change the authenticated user's password
#[utoipa::path(
    put,
    path = "/api/users/change-password",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed successfully", body = ApiResponse<String>),
        (status = 400, description = "Validation error or wrong current password", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all, fields(user_id = auth_user.id()))]
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<ChangePasswordDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    UserService::change_password(
        &state.db,
        auth_user.id(),
        dto,
        state.security_config.bcrypt_cost,
    )
    .await?;
    Ok(message("Password changed successfully"))
}

/// List users with pagination, search, sorting and filters (admin only)
#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("page" = Option<i64>, Query, description = "Page number, 1-based"),
        ("limit" = Option<i64>, Query, description = "Page size, capped at 50"),
        ("q" = Option<String>, Query, description = "Search over username, email and full name"),
        ("sort" = Option<String>, Query, description = "Sort field: id, username, email, created_at"),
        ("order" = Option<String>, Query, description = "asc or desc"),
        ("role" = Option<String>, Query, description = "Filter by role"),
        ("status" = Option<String>, Query, description = "Filter by status")
    ),
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Paginated<User>>),
        (status = 400, description = "Invalid pagination or sort parameter", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
#[instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Paginated<User>>>, AppError> {
    let pagination = USERS_LIST.resolve(&params, &raw)?;
    let (users, total) = UserService::list_users(&state.db, &pagination).await?;
    Ok(success(
        "Users retrieved successfully",
        pagination.envelope(users, total),
    ))
}

/// Get a user by id (admin only)
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<User>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = UserService::get_user(&state.db, id).await?;
    Ok(success("User retrieved successfully", user))
}

/// Update any user including role and status (admin only)
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = AdminUpdateUserDto,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<User>),
        (status = 400, description = "Validation error or no fields to update", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Username or email already exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
#[instrument(skip(state, dto))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<AdminUpdateUserDto>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = UserService::admin_update_user(&state.db, id, dto).await?;
    Ok(success("User updated successfully", user))
}

/// Deactivate a user (admin only)
///
/// Deletion is logical: the row stays and `status` flips to `inactive`.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted successfully", body = ApiResponse<String>),
        (status = 400, description = "Cannot delete your own account", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
#[instrument(skip(state, auth_user), fields(acting_id = auth_user.id()))]
pub async fn delete_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    UserService::delete_user(&state.db, id, auth_user.id()).await?;
    Ok(message("User deleted successfully"))
}
