use std::sync::LazyLock;
use std::time::Instant;

use axum::http::{HeaderValue, Method, StatusCode};
use axum::{Json, Router, middleware};
use chrono::Utc;
use serde_json::json;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::middleware::role::require_admin;
use crate::modules::auth::router::init_auth_router;
use crate::modules::users::router::{init_admin_users_router, init_users_router};
use crate::state::AppState;
use crate::utils::response::{ApiResponse, success};

static START: LazyLock<Instant> = LazyLock::new(Instant::now);

pub fn init_router(state: AppState) -> Router {
    // Pin the process start so /health reports uptime from the first router
    // build rather than the first health probe.
    let _ = *START;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/", axum::routing::get(index))
        .route("/health", axum::routing::get(health))
        .nest(
            "/api/users",
            init_auth_router().merge(init_users_router()).merge(
                init_admin_users_router()
                    .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
            ),
        )
        .fallback(not_found)
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(logging_middleware))
}

async fn index() -> Json<ApiResponse<serde_json::Value>> {
    success(
        "User Management API",
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "docs": "/swagger-ui",
        }),
    )
}

async fn health() -> Json<ApiResponse<serde_json::Value>> {
    success(
        "Server is running",
        json!({
            "timestamp": Utc::now().to_rfc3339(),
            "uptime_secs": START.elapsed().as_secs(),
        }),
    )
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Route not found",
        })),
    )
}
