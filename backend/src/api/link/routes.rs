//! Defines the HTTP routes for links.
//!
//! Owners edit through `/link/{id}`; admins edit any link through
//! `/link/admin/{id}`.

use super::handlers::{
    click_count, create, list, popular, popular_in_category, read, remove, update,
};
use crate::auth::middleware::{attach_profile, require_admin, require_link_owner, require_signin};
use axum::{
    Router, middleware,
    routing::{get, post, put},
};

pub fn link_router() -> Router {
    Router::new()
        .route(
            "/link",
            post(create)
                .layer(middleware::from_fn(attach_profile))
                .layer(middleware::from_fn(require_signin)),
        )
        .route(
            "/links",
            post(list)
                .layer(middleware::from_fn(require_admin))
                .layer(middleware::from_fn(require_signin)),
        )
        .route("/click-count", put(click_count))
        .route("/link/popular", get(popular))
        .route("/link/popular/{slug}", get(popular_in_category))
        .route(
            "/link/{id}",
            get(read).merge(
                put(update)
                    .delete(remove)
                    .layer(middleware::from_fn(require_link_owner))
                    .layer(middleware::from_fn(attach_profile))
                    .layer(middleware::from_fn(require_signin)),
            ),
        )
        .route(
            "/link/admin/{id}",
            put(update)
                .delete(remove)
                .layer(middleware::from_fn(require_admin))
                .layer(middleware::from_fn(require_signin)),
        )
}
