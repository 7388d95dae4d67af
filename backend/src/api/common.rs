//! Error handling utilities for API responses.
//!
//! Provides the client-facing error body and the conversion from service-layer
//! errors to it. Includes:
//! - `ApiError`, rendered as `{"error": "..."}`
//! - ServiceError to HTTP status code mapping
//! - A JSON extractor that runs `validator` rules before the handler
//! - Path and query extractors whose rejections use the same error body
//! - limit/skip pagination for list endpoints
//!
//! # Error Handling Flow
//! 1. Service layer returns domain-specific `ServiceError`
//! 2. `service_error_to_http` converts to the default HTTP response
//! 3. Handlers override the message where an endpoint has its own wording

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::{Validate, ValidationErrors};

use crate::errors::ServiceError;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Error returned to clients as `{"error": message}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        service_error_to_http(error)
    }
}

/// Success body for endpoints that only report an outcome.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Pagination parameters for list endpoints
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PaginationFilter {
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

impl PaginationFilter {
    /// Get limit with default, capped at [`MAX_LIMIT`]
    pub fn limit(&self) -> i64 {
        self.limit
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT)
    }

    /// Get skip with default
    pub fn skip(&self) -> i64 {
        self.skip.unwrap_or(0).max(0)
    }
}

/// Converts ServiceError to the default HTTP error
pub fn service_error_to_http(error: ServiceError) -> ApiError {
    match error {
        ServiceError::Validation { message } => ApiError::unprocessable(message),
        ServiceError::NotFound { entity, .. } => {
            ApiError::bad_request(format!("{} not found", entity))
        }
        ServiceError::AlreadyExists { entity, .. } => {
            ApiError::bad_request(format!("{} already exists", entity))
        }
        ServiceError::Unauthorized { message } => ApiError::unauthorized(message),
        ServiceError::InvalidToken | ServiceError::TokenExpired => {
            ApiError::unauthorized("Expired or invalid link. Please try again")
        }
        ServiceError::NotificationFailed { source } => {
            tracing::error!("Notification error: {}", source);
            ApiError::unprocessable("We could not verify your email. Please try again.")
        }
        ServiceError::Database { source } => {
            tracing::error!("Database error: {}", source);
            ApiError::bad_request("Something went wrong. Please try again later")
        }
        ServiceError::InternalError { message } => {
            tracing::error!("Internal error: {}", message);
            ApiError::bad_request("Something went wrong. Please try again later")
        }
    }
}

/// First validation message, taking fields in name order.
pub fn first_validation_message(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by(|(left, _), (right, _)| left.cmp(right));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .next()
        .unwrap_or_else(|| "Invalid request".to_string())
}

/// JSON body extractor that also runs the payload's `validator` rules.
///
/// Malformed JSON and rule violations are both rejected with 422.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::unprocessable(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| ApiError::unprocessable(first_validation_message(&errors)))?;

        Ok(Self(value))
    }
}

/// [`ValidatedJson`] for bodies whose fields are all optional: an empty body
/// stands for `T::default()`.
#[derive(Debug, Clone)]
pub struct ValidatedJsonOrDefault<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJsonOrDefault<T>
where
    T: DeserializeOwned + Validate + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::unprocessable(rejection.body_text()))?;

        let value = if bytes.iter().all(u8::is_ascii_whitespace) {
            T::default()
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::unprocessable(format!("Invalid request body: {e}")))?
        };

        value
            .validate()
            .map_err(|errors| ApiError::unprocessable(first_validation_message(&errors)))?;

        Ok(Self(value))
    }
}

/// `Path` extractor rejecting with a 400 [`ApiError`].
#[derive(Debug, Clone)]
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// `Query` extractor rejecting with a 422 [`ApiError`].
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::unprocessable(rejection.body_text()))?;
        Ok(Self(value))
    }
}
