use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Application error taxonomy, mapped to HTTP status codes in `IntoResponse`.
///
/// Every handler and service returns `Result<_, AppError>`; the error shape
/// sent to clients is the same envelope used for success responses:
/// `{"success": false, "message": ..., "errors": [...]}`.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or missing input (400).
    Validation(String),
    /// Aggregated per-field validation failures (400).
    ValidationErrors(Vec<FieldError>),
    /// Missing, invalid, or expired credentials (401).
    Unauthorized(String),
    /// Authenticated but not allowed (403).
    Forbidden(String),
    /// Resource does not exist (404).
    NotFound(String),
    /// Duplicate username/email or constraint violation (409).
    Conflict(String),
    /// Connection pool exhausted or store unavailable (503).
    ServiceUnavailable(String),
    /// Hashing/signing/store failure (500). Detail is logged, not leaked.
    Internal(anyhow::Error),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn validation_errors(errors: Vec<FieldError>) -> Self {
        Self::ValidationErrors(errors)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::Internal(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::ValidationErrors(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValidationErrors(errors) => {
                write!(f, "Validation failed ({} field(s))", errors.len())
            }
            Self::Internal(err) => write!(f, "{err}"),
            Self::Validation(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::ServiceUnavailable(message) => write!(f, "{message}"),
        }
    }
}

fn is_development() -> bool {
    std::env::var("APP_ENV")
        .map(|v| v == "development")
        .unwrap_or(false)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            AppError::ValidationErrors(errors) => Json(json!({
                "success": false,
                "message": "Validation failed",
                "errors": errors,
            })),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                let message = if is_development() {
                    err.to_string()
                } else {
                    "Internal server error".to_string()
                };
                Json(json!({
                    "success": false,
                    "message": message,
                }))
            }
            AppError::Validation(message)
            | AppError::Unauthorized(message)
            | AppError::Forbidden(message)
            | AppError::NotFound(message)
            | AppError::Conflict(message)
            | AppError::ServiceUnavailable(message) => Json(json!({
                "success": false,
                "message": message,
            })),
        };

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::not_found("Record not found"),
            sqlx::Error::PoolTimedOut => {
                AppError::ServiceUnavailable("Database is busy, try again later".to_string())
            }
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                // unique_violation
                Some("23505") => AppError::conflict("Duplicate entry found"),
                // foreign_key_violation
                Some("23503") => AppError::bad_request("Referenced record not found"),
                _ => AppError::internal(err),
            },
            _ => AppError::internal(err),
        }
    }
}
