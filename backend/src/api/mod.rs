//! Central module for organizing the application's main API endpoints.
//!
//! This module acts as a top-level container for the API domains (users,
//! categories and links) and assembles them, together with the
//! authentication routes, into the application router.

pub mod category;
pub mod common;
pub mod link;
pub mod user;

use axum::{
    Extension, Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    response::Json,
    routing::get,
};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Builds the application router: every endpoint under `/api`, shared state
/// injected as an `Extension`, CORS restricted to the client origin.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(crate::auth::routes::auth_router())
        .merge(user::routes::user_router())
        .merge(category::routes::category_router())
        .merge(link::routes::link_router());

    Router::new()
        .route("/", get(root_handler))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.client_url))
                .layer(Extension(state)),
        )
}

fn cors_layer(client_url: &str) -> CorsLayer {
    let origin = match HeaderValue::from_str(client_url.trim_end_matches('/')) {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(e) => {
            tracing::warn!("Invalid CLIENT_URL {}: {}. CORS disabled.", client_url, e);
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(origin)
}

async fn root_handler() -> Json<Value> {
    Json(json!({
        "service": "Linkhub Backend",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
