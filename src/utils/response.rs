use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Standard success envelope: `{"success": true, "message": ..., "data": ...}`.
///
/// Error responses use the same shape with `success: false`; see
/// [`crate::utils::errors::AppError`].
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub fn success<T: Serialize>(message: impl Into<String>, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        message: message.into(),
        data: Some(data),
    })
}

/// Success envelope without a `data` payload.
pub fn message(message: impl Into<String>) -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse {
        success: true,
        message: message.into(),
        data: None,
    })
}
