//! Data structures for authentication-related entities.
//!
//! This module defines the request/response payloads for registration, login
//! and password reset, the pending-registration payload carried inside
//! activation tokens, and the request-scoped identity set by the middleware.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::database::models::UserSummary;

/// Registration request payload
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 32, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Email is not valid"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

/// Account activation request payload
#[derive(Debug, Deserialize, Validate)]
pub struct ActivateRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

/// Login request payload
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Email is not valid"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

/// Login response containing the session token and user info
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

/// Forgot password request payload
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Email is not valid"))]
    pub email: String,
}

/// Reset password request payload
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[serde(rename = "resetPasswordLink")]
    #[validate(length(min = 1, message = "Token is required"))]
    pub reset_password_link: String,

    #[serde(rename = "newPassword")]
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub new_password: String,
}

/// A registration that has not been activated yet.
///
/// Never persisted: it travels inside the signed activation token and is
/// turned into a user only when that token comes back.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationIntent {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for RegistrationIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationIntent")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Identity attached to the request once the session token has been verified.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
}
