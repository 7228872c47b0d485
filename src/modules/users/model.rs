//! User entity and request DTOs.
//!
//! The `password` column travels inside [`User`] so the authentication chain
//! and the services can verify it, but it is never serialized: both serde and
//! the OpenAPI schema skip it.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

pub(crate) static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").unwrap());

pub(crate) static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").unwrap());

/// Passwords must carry at least one letter and one number.
pub(crate) fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if has_letter && has_digit {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_strength");
        err.message = Some("Password must contain at least one letter and one number".into());
        Err(err)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// A user account. One row per account; deletion is logical (`status`
/// flips to `inactive`, the row stays).
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Self-service profile update. Only fields present in the request are
/// written; role and status are deliberately absent here.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(
        length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username can only contain letters, numbers, and underscores"
        )
    )]
    pub username: Option<String>,
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 100, message = "Full name must not exceed 100 characters"))]
    pub full_name: Option<String>,
    #[validate(regex(path = *PHONE_REGEX, message = "Please provide a valid phone number"))]
    pub phone: Option<String>,
}

/// Admin update: everything the self-service update allows, plus role and
/// status.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AdminUpdateUserDto {
    #[validate(
        length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username can only contain letters, numbers, and underscores"
        )
    )]
    pub username: Option<String>,
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 100, message = "Full name must not exceed 100 characters"))]
    pub full_name: Option<String>,
    #[validate(regex(path = *PHONE_REGEX, message = "Please provide a valid phone number"))]
    pub phone: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

impl AdminUpdateUserDto {
    pub fn from_profile(dto: UpdateProfileDto) -> Self {
        Self {
            username: dto.username,
            email: dto.email,
            full_name: dto.full_name,
            phone: dto.phone,
            role: None,
            status: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordDto {
    #[serde(rename = "currentPassword")]
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[serde(rename = "newPassword")]
    #[validate(
        length(min = 6, message = "New password must be at least 6 characters long"),
        custom(function = validate_password_strength)
    )]
    pub new_password: String,
    #[serde(rename = "confirmPassword")]
    #[validate(must_match(
        other = new_password,
        message = "Password confirmation does not match new password"
    ))]
    pub confirm_password: String,
}
