//! Handler functions for link endpoints.
//!
//! These functions process requests for link data, interact with the link
//! service, and return links with their poster and categories resolved.

use crate::api::common::{
    ApiError, ApiPath, MessageResponse, PaginationFilter, ValidatedJson, ValidatedJsonOrDefault,
    service_error_to_http,
};
use crate::database::models::{ClickCountRequest, Link, LinkRequest, User};
use crate::errors::ServiceError;
use crate::services::link_service::LinkService;
use crate::state::AppState;
use axum::extract::{Extension, Json};

fn link_error(fallback: &'static str) -> impl FnOnce(ServiceError) -> ApiError {
    move |e| match e {
        ServiceError::AlreadyExists { .. } => ApiError::bad_request("Link already exists"),
        ServiceError::Validation { .. } | ServiceError::NotFound { .. } => {
            service_error_to_http(e)
        }
        other => {
            tracing::error!("{}: {}", fallback, other);
            ApiError::bad_request(fallback)
        }
    }
}

/// Handle link creation; interested users are emailed in the background.
#[axum::debug_handler]
pub async fn create(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<User>,
    ValidatedJson(payload): ValidatedJson<LinkRequest>,
) -> Result<Json<Link>, ApiError> {
    tracing::info!("Creating link for user: {}", user.id);

    let link = LinkService::from_state(&state)
        .create(payload, &user)
        .await
        .map_err(link_error("Error saving link"))?;

    let announced = link.clone();
    tokio::spawn(async move {
        let service = LinkService::from_state(&state);
        if let Err(e) = service.notify_interested_users(&announced).await {
            tracing::error!("Failed to announce link {}: {}", announced.id, e);
        }
    });

    Ok(Json(link))
}

/// Lists all links, newest first. An empty body uses the default page.
#[axum::debug_handler]
pub async fn list(
    Extension(state): Extension<AppState>,
    ValidatedJsonOrDefault(filter): ValidatedJsonOrDefault<PaginationFilter>,
) -> Result<Json<Vec<Link>>, ApiError> {
    let links = LinkService::from_state(&state)
        .list(filter.limit(), filter.skip())
        .await
        .map_err(link_error("Could not list links"))?;

    Ok(Json(links))
}

#[axum::debug_handler]
pub async fn read(
    Extension(state): Extension<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Link>, ApiError> {
    let link = LinkService::from_state(&state)
        .read(&id)
        .await
        .map_err(|e| {
            tracing::warn!("Link {} not readable: {}", id, e);
            ApiError::bad_request("Error finding link")
        })?;

    Ok(Json(link))
}

#[axum::debug_handler]
pub async fn update(
    Extension(state): Extension<AppState>,
    ApiPath(id): ApiPath<String>,
    ValidatedJson(payload): ValidatedJson<LinkRequest>,
) -> Result<Json<Link>, ApiError> {
    let link = LinkService::from_state(&state)
        .update(&id, payload)
        .await
        .map_err(link_error("Error updating the link"))?;

    tracing::info!("Link {} updated", link.id);
    Ok(Json(link))
}

#[axum::debug_handler]
pub async fn remove(
    Extension(state): Extension<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    LinkService::from_state(&state)
        .remove(&id)
        .await
        .map_err(link_error("Error removing the link"))?;

    Ok(MessageResponse::new("Link has been removed successfully"))
}

#[axum::debug_handler]
pub async fn click_count(
    Extension(state): Extension<AppState>,
    ValidatedJson(payload): ValidatedJson<ClickCountRequest>,
) -> Result<Json<Link>, ApiError> {
    let link = LinkService::from_state(&state)
        .click(&payload.link_id)
        .await
        .map_err(|e| {
            tracing::warn!("Click not counted for {}: {}", payload.link_id, e);
            ApiError::bad_request("Could not view count")
        })?;

    Ok(Json(link))
}

/// Top links by clicks across all categories.
#[axum::debug_handler]
pub async fn popular(Extension(state): Extension<AppState>) -> Result<Json<Vec<Link>>, ApiError> {
    let links = LinkService::from_state(&state)
        .popular()
        .await
        .map_err(link_error("Could not find links"))?;

    Ok(Json(links))
}

/// Top links by clicks in the category named by `slug`.
#[axum::debug_handler]
pub async fn popular_in_category(
    Extension(state): Extension<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<Vec<Link>>, ApiError> {
    let links = LinkService::from_state(&state)
        .popular_in_category(&slug)
        .await
        .map_err(link_error("Could not find links"))?;

    Ok(Json(links))
}
