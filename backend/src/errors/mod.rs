//! Global application error types.
//!
//! Repository implementations report [`StoreError`], the notification sink
//! reports [`NotificationError`], and the business flows combine both into
//! [`ServiceError`]. The HTTP layer (`api::common`) is the only place these
//! are turned into client-facing messages.

use crate::utils::jwt::TokenError;
use thiserror::Error;

/// Failure reported by a persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint (email, username, slug) was violated.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    /// The store could not complete the operation.
    #[error("store unavailable: {0}")]
    Backend(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                StoreError::DuplicateKey(db_error.message().to_string())
            }
            _ => StoreError::Backend(error),
        }
    }
}

/// Failure reported by the notification sink.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("email delivery is not configured")]
    Disabled,
    #[error("invalid email address: {0}")]
    Address(String),
    #[error("failed to build email: {0}")]
    Build(String),
    #[error("failed to send email: {0}")]
    Transport(String),
}

/// Generic service error that can be used across all flows
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("{entity} already exists: {identifier}")]
    AlreadyExists { entity: String, identifier: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Notification failed: {source}")]
    NotificationFailed {
        #[from]
        source: NotificationError,
    },

    #[error("Database error: {source}")]
    Database {
        #[from]
        source: StoreError,
    },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<TokenError> for ServiceError {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::Expired => ServiceError::TokenExpired,
            TokenError::Invalid => ServiceError::InvalidToken,
            TokenError::Signing(message) => ServiceError::InternalError { message },
        }
    }
}

impl ServiceError {
    // Helper constructors for common patterns

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn already_exists(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

}
