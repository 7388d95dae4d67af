//! Handler functions for category endpoints.

use crate::api::common::{
    ApiError, ApiPath, ApiQuery, MessageResponse, PaginationFilter, ValidatedJson,
    service_error_to_http,
};
use crate::database::models::{Category, CreateCategoryRequest, UpdateCategoryRequest, User};
use crate::errors::ServiceError;
use crate::services::category_service::{CategoryService, CategoryWithLinks};
use crate::state::AppState;
use axum::extract::{Extension, Json};

/// Keeps validation errors, replaces everything else with `fallback`.
fn category_error(fallback: &'static str) -> impl FnOnce(ServiceError) -> ApiError {
    move |e| match e {
        ServiceError::Validation { .. } => service_error_to_http(e),
        other => {
            tracing::warn!("{}: {}", fallback, other);
            ApiError::bad_request(fallback)
        }
    }
}

#[axum::debug_handler]
pub async fn create(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<User>,
    ValidatedJson(payload): ValidatedJson<CreateCategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    let category = CategoryService::from_state(&state)
        .create(payload, &user)
        .await
        .map_err(category_error("Category create failed"))?;

    Ok(Json(category))
}

#[axum::debug_handler]
pub async fn list(Extension(state): Extension<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = CategoryService::from_state(&state)
        .list()
        .await
        .map_err(category_error("Categories could not load"))?;

    Ok(Json(categories))
}

/// Returns the category with one page of its links (`?limit=&skip=`).
#[axum::debug_handler]
pub async fn read(
    Extension(state): Extension<AppState>,
    ApiPath(slug): ApiPath<String>,
    ApiQuery(filter): ApiQuery<PaginationFilter>,
) -> Result<Json<CategoryWithLinks>, ApiError> {
    let category = CategoryService::from_state(&state)
        .read(&slug, &filter)
        .await
        .map_err(category_error("Could not load category"))?;

    Ok(Json(category))
}

#[axum::debug_handler]
pub async fn update(
    Extension(state): Extension<AppState>,
    ApiPath(slug): ApiPath<String>,
    ValidatedJson(payload): ValidatedJson<UpdateCategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    let category = CategoryService::from_state(&state)
        .update(&slug, payload)
        .await
        .map_err(category_error("Could not find category to update"))?;

    tracing::info!("Category {} updated", category.slug);
    Ok(Json(category))
}

#[axum::debug_handler]
pub async fn remove(
    Extension(state): Extension<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    CategoryService::from_state(&state)
        .remove(&slug)
        .await
        .map_err(category_error("Could not delete category"))?;

    Ok(MessageResponse::new("Category deleted successfully"))
}
