//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle registration, activation, login and password resets.
//! They are public and merged into the `/api` router.

use crate::auth::handlers::*;
use axum::{Router, routing::post};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/register/activate", post(activate))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}
