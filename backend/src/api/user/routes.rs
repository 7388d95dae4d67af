//! Defines the HTTP routes for user profiles.

use super::handlers::{read, update};
use crate::auth::middleware::{attach_profile, require_admin, require_signin};
use axum::{Router, middleware, routing::get};

pub fn user_router() -> Router {
    Router::new()
        .route(
            "/user",
            get(read)
                .put(update)
                .layer(middleware::from_fn(attach_profile))
                .layer(middleware::from_fn(require_signin)),
        )
        .route(
            "/admin",
            get(read)
                .layer(middleware::from_fn(require_admin))
                .layer(middleware::from_fn(require_signin)),
        )
}
