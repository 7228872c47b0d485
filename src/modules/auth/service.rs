use sqlx::PgPool;
use tracing::instrument;

use crate::config::jwt::JwtConfig;
use crate::modules::auth::model::{AuthData, LoginDto, RegisterDto};
use crate::modules::users::model::{User, UserStatus};
use crate::modules::users::service::{UserService, normalize_optional};
use crate::utils::errors::AppError;
use crate::utils::jwt::create_access_token;
use crate::utils::password::{hash_password, verify_password};

pub struct AuthService;

impl AuthService {
    /// Creates an account and immediately issues a token for it. Username
    /// and email are checked together: either collision reports the same
    /// conflict.
    #[instrument(skip_all, fields(username = %dto.username))]
    pub async fn register(
        db: &PgPool,
        dto: RegisterDto,
        jwt_config: &JwtConfig,
        bcrypt_cost: u32,
    ) -> Result<AuthData, AppError> {
        let username = dto.username.trim().to_string();
        let email = dto.email.trim().to_lowercase();

        if UserService::username_or_email_taken(db, &username, &email, None).await? {
            return Err(AppError::conflict("Username or email already exists"));
        }

        let hashed = hash_password(&dto.password, bcrypt_cost)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password, full_name, phone) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, username, email, password, full_name, phone, role, status, \
                       created_at, updated_at",
        )
        .bind(&username)
        .bind(&email)
        .bind(&hashed)
        .bind(dto.full_name.as_deref().and_then(normalize_optional))
        .bind(dto.phone.as_deref().and_then(normalize_optional))
        .fetch_one(db)
        .await?;

        let token = create_access_token(user.id, &user.username, &user.email, user.role, jwt_config)?;

        Ok(AuthData { user, token })
    }

    /// Verifies credentials and issues a token. Unknown email and wrong
    /// password produce the same 401 so the response does not reveal which
    /// half failed; an inactive account is reported distinctly (403) but
    /// only after the email matched a row.
    #[instrument(skip_all)]
    pub async fn login(
        db: &PgPool,
        dto: LoginDto,
        jwt_config: &JwtConfig,
    ) -> Result<AuthData, AppError> {
        let email = dto.email.trim().to_lowercase();

        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password, full_name, phone, role, status, \
                    created_at, updated_at \
             FROM users WHERE email = $1",
        )
        .bind(&email)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

        if user.status == UserStatus::Inactive {
            return Err(AppError::forbidden("Account is inactive"));
        }

        if !verify_password(&dto.password, &user.password)? {
            return Err(AppError::unauthorized("Invalid email or password"));
        }

        let token = create_access_token(user.id, &user.username, &user.email, user.role, jwt_config)?;

        Ok(AuthData { user, token })
    }
}
