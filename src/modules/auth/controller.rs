use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::instrument;
use utoipa::ToSchema;

use super::model::{AuthData, LoginDto, RegisterDto};
use super::service::AuthService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::response::{ApiResponse, success};
use crate::validator::ValidatedJson;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// Register a new account and receive a JWT token
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterDto,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<AuthData>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Username or email already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterDto>,
) -> Result<(StatusCode, Json<ApiResponse<AuthData>>), AppError> {
    let data = AuthService::register(
        &state.db,
        dto,
        &state.jwt_config,
        state.security_config.bcrypt_cost,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        success("User registered successfully", data),
    ))
}

/// Login with email and password and receive a JWT token
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthData>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 403, description = "Account is inactive", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginDto>,
) -> Result<Json<ApiResponse<AuthData>>, AppError> {
    let data = AuthService::login(&state.db, dto, &state.jwt_config).await?;
    Ok(success("Login successful", data))
}
