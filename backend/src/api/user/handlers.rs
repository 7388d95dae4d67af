//! Handler functions for user profile API endpoints.
//!
//! The acting user is resolved by the middleware chain and arrives as an
//! `Extension<User>`; these handlers never look it up themselves.

use crate::api::common::{ApiError, ValidatedJson, service_error_to_http};
use crate::database::models::{UpdateUserRequest, User, UserProfile};
use crate::services::user_service::{UserService, UserWithLinks};
use crate::state::AppState;
use axum::extract::{Extension, Json};

/// Returns the signed-in user's profile and the links they posted.
#[axum::debug_handler]
pub async fn read(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<UserWithLinks>, ApiError> {
    tracing::info!("Getting profile for user: {}", user.id);

    let service = UserService::from_state(&state);
    let profile = service.profile_with_links(&user).await.map_err(|e| {
        tracing::error!("Failed to load links for user {}: {}", user.id, e);
        ApiError::bad_request("Could not find links")
    })?;

    Ok(Json(profile))
}

/// Updates name, interests and optionally the password of the signed-in user.
#[axum::debug_handler]
pub async fn update(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<User>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let user_id = user.id.clone();
    let service = UserService::from_state(&state);

    let profile = service.update_profile(user, payload).await.map_err(|e| {
        tracing::error!("Failed to update user {}: {}", user_id, e);
        service_error_to_http(e)
    })?;

    Ok(Json(profile))
}
