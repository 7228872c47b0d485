use sqlx::PgPool;

use crate::config::cors::CorsConfig;
use crate::config::database::{DatabaseConfig, init_db_pool};
use crate::config::jwt::JwtConfig;
use crate::config::rate_limit::RateLimitConfig;
use crate::config::security::SecurityConfig;

/// Shared application state. Cheap to clone; immutable after startup apart
/// from the pool's internal bookkeeping.
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub security_config: SecurityConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
}

pub async fn init_app_state() -> Result<AppState, sqlx::Error> {
    let db = init_db_pool(&DatabaseConfig::from_env()).await?;

    Ok(AppState {
        db,
        jwt_config: JwtConfig::from_env(),
        security_config: SecurityConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        rate_limit_config: RateLimitConfig::from_env(),
    })
}
