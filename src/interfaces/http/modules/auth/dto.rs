//! Authentication DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{CreateUserDto, UserRole};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Please provide a name."))]
    pub name: String,
    #[validate(email(message = "Please add a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Min length of password should be 6 characters."))]
    pub password: String,
    /// `user` (default) or `publisher`
    pub role: Option<UserRole>,
}

impl From<RegisterRequest> for CreateUserDto {
    fn from(r: RegisterRequest) -> Self {
        CreateUserDto {
            name: r.name.trim().to_string(),
            email: r.email.trim().to_lowercase(),
            role: r.role,
            password: r.password,
        }
    }
}

/// Both fields are checked by the login use-case so a missing one gets
/// the same message as an empty one.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Please add a valid email"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 6, message = "Min length of password should be 6 characters."))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
}
