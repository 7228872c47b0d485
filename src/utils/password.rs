use bcrypt::{hash, verify};

use crate::utils::errors::AppError;

/// Hash a plaintext password with the configured bcrypt cost.
///
/// The bcrypt error never discloses whether the input or the stored hash was
/// at fault; callers only see an internal error.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost).map_err(|e| AppError::internal(anyhow::anyhow!("Password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hashed: &str) -> Result<bool, AppError> {
    verify(password, hashed)
        .map_err(|e| AppError::internal(anyhow::anyhow!("Password verification failed: {e}")))
}
