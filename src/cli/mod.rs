use anyhow::bail;
use sqlx::PgPool;

use crate::config::security::SecurityConfig;
use crate::modules::users::model::UserRole;
use crate::utils::password::hash_password;

/// Seeds an admin account from the command line. The API itself never
/// creates admins: registration always grants the default role, so the first
/// admin has to come from here.
pub async fn create_admin(
    db: &PgPool,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let email = email.trim().to_lowercase();
    let hashed = hash_password(password, SecurityConfig::from_env().bcrypt_cost)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    let result = sqlx::query(
        "INSERT INTO users (username, email, password, role)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(username)
    .bind(&email)
    .bind(hashed)
    .bind(UserRole::Admin)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        bail!("User with this email already exists");
    }

    Ok(())
}
