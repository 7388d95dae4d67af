//! Request handlers for authentication-related API endpoints.
//!
//! Each handler runs one flow of [`AuthService`] and maps its failures to the
//! wording that endpoint has always used.

use axum::{extract::Extension, response::Json};

use crate::api::common::{ApiError, MessageResponse, ValidatedJson, service_error_to_http};
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::errors::ServiceError;
use crate::state::AppState;

/// Handle registration request
#[axum::debug_handler]
pub async fn register(
    Extension(state): Extension<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let service = AuthService::from_state(&state);

    let email = service.register(payload).await.map_err(|e| match e {
        ServiceError::AlreadyExists { .. } => {
            ApiError::bad_request("Email is taken. Please choose another email.")
        }
        ServiceError::NotificationFailed { source } => {
            tracing::error!("Activation email failed: {}", source);
            ApiError::unprocessable("We could not verify your email. Please try again.")
        }
        other => service_error_to_http(other),
    })?;

    Ok(MessageResponse::new(format!(
        "Email has been sent to {email}. Follow the instructions to complete your registration."
    )))
}

/// Handle account activation request
#[axum::debug_handler]
pub async fn activate(
    Extension(state): Extension<AppState>,
    ValidatedJson(payload): ValidatedJson<ActivateRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let service = AuthService::from_state(&state);

    service.activate(payload).await.map_err(|e| match e {
        ServiceError::AlreadyExists { .. } => {
            ApiError::unauthorized("Email is taken. Please choose another email.")
        }
        ServiceError::Database { source } => {
            tracing::error!("Failed to save activated user: {}", source);
            ApiError::unauthorized("Error saving user in database. Please try again later.")
        }
        other => service_error_to_http(other),
    })?;

    Ok(MessageResponse::new(
        "Registration was successful. Please proceed to login.",
    ))
}

/// Handle login request
#[axum::debug_handler]
pub async fn login(
    Extension(state): Extension<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let service = AuthService::from_state(&state);

    let response = service.login(payload).await.map_err(|e| match e {
        ServiceError::NotFound { .. } => ApiError::bad_request(
            "No user matching this email was found in the database. Please register and try again.",
        ),
        ServiceError::Unauthorized { .. } => {
            ApiError::bad_request("Email and password do not match")
        }
        other => service_error_to_http(other),
    })?;

    tracing::info!("User {} logged in", response.user.id);
    Ok(Json(response))
}

/// Handle forgot password request
#[axum::debug_handler]
pub async fn forgot_password(
    Extension(state): Extension<AppState>,
    ValidatedJson(payload): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let service = AuthService::from_state(&state);

    let email = service.forgot_password(payload).await.map_err(|e| match e {
        ServiceError::NotFound { .. } => {
            ApiError::bad_request("No user associated with this email found in the database")
        }
        ServiceError::Database { source } => {
            tracing::error!("Failed to store reset token: {}", source);
            ApiError::bad_request("Password reset failed. Please try again later")
        }
        ServiceError::NotificationFailed { source } => {
            tracing::error!("Password reset email failed: {}", source);
            ApiError::unprocessable("We could not verify your email. Please try again later.")
        }
        other => service_error_to_http(other),
    })?;

    Ok(MessageResponse::new(format!(
        "Email has been sent to {email}. Click on the link to reset your password"
    )))
}

/// Handle reset password request
#[axum::debug_handler]
pub async fn reset_password(
    Extension(state): Extension<AppState>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let service = AuthService::from_state(&state);

    service.reset_password(payload).await.map_err(|e| match e {
        ServiceError::InvalidToken | ServiceError::TokenExpired => {
            ApiError::bad_request("Expired or invalid link. Please try again")
        }
        ServiceError::Database { source } => {
            tracing::error!("Failed to store new password: {}", source);
            ApiError::bad_request("Password reset failed. Please try again")
        }
        other => service_error_to_http(other),
    })?;

    Ok(MessageResponse::new(
        "Your password has been updated. You may proceed to login with your new credentials",
    ))
}
