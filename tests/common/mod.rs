use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;
use userdeck::config::cors::CorsConfig;
use userdeck::config::jwt::JwtConfig;
use userdeck::config::rate_limit::RateLimitConfig;
use userdeck::config::security::SecurityConfig;
use userdeck::router::init_router;
use userdeck::state::AppState;
use userdeck::utils::password::hash_password;
use uuid::Uuid;

/// Bcrypt cost used for fixtures and by the app under test. Low on purpose:
/// the default cost makes every login round-trip noticeably slow.
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-key-for-integration-tests".to_string(),
        token_expiry: 3600,
    }
}

pub fn setup_test_app(pool: PgPool) -> Router {
    let state = AppState {
        db: pool,
        jwt_config: test_jwt_config(),
        security_config: SecurityConfig {
            bcrypt_cost: TEST_BCRYPT_COST,
        },
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        rate_limit_config: RateLimitConfig::default(),
    };
    init_router(state)
}

#[allow(dead_code)]
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
}

pub fn unique_username() -> String {
    format!("user_{}", &Uuid::new_v4().simple().to_string()[..12])
}

pub fn unique_email() -> String {
    format!("{}@example.com", unique_username())
}

/// Inserts a user row directly, bypassing the HTTP surface.
pub async fn create_test_user(pool: &PgPool, role: &str, status: &str) -> TestUser {
    let username = unique_username();
    let email = unique_email();
    let password = "testpass123".to_string();
    let hashed = hash_password(&password, TEST_BCRYPT_COST).unwrap();

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (username, email, password, role, status)
         VALUES ($1, $2, $3, $4::user_role, $5::user_status)
         RETURNING id",
    )
    .bind(&username)
    .bind(&email)
    .bind(&hashed)
    .bind(role)
    .bind(status)
    .fetch_one(pool)
    .await
    .unwrap();

    TestUser {
        id,
        username,
        email,
        password,
    }
}

/// Logs in through the API and returns the bearer token.
pub async fn get_auth_token(app: Router, email: &str, password: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/api/users/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": email,
                "password": password
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let body = body_json(response).await;
    body["data"]["token"].as_str().unwrap().to_string()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

#[allow(dead_code)]
pub fn authed_json_request(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

#[allow(dead_code)]
pub fn authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}
