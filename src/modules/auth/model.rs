use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::modules::users::model::{
    PHONE_REGEX, USERNAME_REGEX, User, validate_password_strength,
};

/// JWT claims. The token is a stateless assertion of identity; role and
/// status checks for protected requests re-read the live row, so a stale
/// role claim only survives until the next request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a string.
    pub sub: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterDto {
    #[validate(
        length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username can only contain letters, numbers, and underscores"
        )
    )]
    pub username: String,
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,
    #[validate(
        length(min = 6, message = "Password must be at least 6 characters long"),
        custom(function = validate_password_strength)
    )]
    pub password: String,
    #[validate(length(max = 100, message = "Full name must not exceed 100 characters"))]
    pub full_name: Option<String>,
    #[validate(regex(path = *PHONE_REGEX, message = "Please provide a valid phone number"))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginDto {
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Payload for register/login responses: the sanitized user plus a bearer
/// token.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthData {
    pub user: User,
    pub token: String,
}
