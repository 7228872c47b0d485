use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{AuthData, LoginDto, RegisterDto};
use crate::modules::users::model::{
    AdminUpdateUserDto, ChangePasswordDto, UpdateProfileDto, User, UserRole, UserStatus,
};
use crate::utils::pagination::{PaginationMeta, PaginationParams, Sorting};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register,
        crate::modules::auth::controller::login,
        crate::modules::users::controller::get_profile,
        crate::modules::users::controller::update_profile,
        crate::modules::users::controller::change_password,
        crate::modules::users::controller::list_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
    ),
    components(
        schemas(
            User,
            UserRole,
            UserStatus,
            RegisterDto,
            LoginDto,
            AuthData,
            UpdateProfileDto,
            AdminUpdateUserDto,
            ChangePasswordDto,
            PaginationParams,
            PaginationMeta,
            Sorting,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and login"),
        (name = "Users", description = "Profile self-service endpoints"),
        (name = "Admin", description = "Administrative user management")
    ),
    info(
        title = "UserDeck API",
        version = "0.1.0",
        description = "A user management REST API built with Rust, Axum, and PostgreSQL featuring JWT-based authentication and role-based access control.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
