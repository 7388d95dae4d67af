//! Defines the HTTP routes for categories. Reads are public; writes are
//! admin only.

use super::handlers::{create, list, read, remove, update};
use crate::auth::middleware::{require_admin, require_signin};
use axum::{
    Router, middleware,
    routing::{get, post, put},
};

pub fn category_router() -> Router {
    Router::new()
        .route("/categories", get(list))
        .route(
            "/category",
            post(create)
                .layer(middleware::from_fn(require_admin))
                .layer(middleware::from_fn(require_signin)),
        )
        .route(
            "/category/{slug}",
            get(read).merge(
                put(update)
                    .delete(remove)
                    .layer(middleware::from_fn(require_admin))
                    .layer(middleware::from_fn(require_signin)),
            ),
        )
}
