//! Middleware for protecting authenticated routes and handling authorization.
//!
//! Gates are layered per route, innermost last:
//! `require_signin` → `attach_profile` → `require_link_owner`, or
//! `require_signin` → `require_admin`. Each stage stores what it resolved in
//! the request extensions for the next stage and the handler.

use axum::{
    extract::{Extension, Request},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::api::common::{ApiError, ApiPath};
use crate::auth::models::AuthContext;
use crate::database::models::{Link, User};
use crate::state::AppState;

/// A resource with a single owning user.
pub trait OwnedResource {
    fn owner_id(&self) -> &str;
}

impl OwnedResource for Link {
    fn owner_id(&self) -> &str {
        &self.posted_by.id
    }
}

/// Checks that `requester` owns `resource`.
///
/// An absent resource is reported as "Could not find {entity}" (400); a
/// resource owned by someone else as 401.
pub fn authorize_owner<R: OwnedResource>(
    resource: Option<R>,
    entity: &str,
    requester: &User,
) -> Result<R, ApiError> {
    let resource =
        resource.ok_or_else(|| ApiError::bad_request(format!("Could not find {entity}")))?;

    if resource.owner_id() != requester.id {
        return Err(ApiError::unauthorized(
            "You are not authorized to access this resource",
        ));
    }

    Ok(resource)
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn auth_context(request: &Request) -> Result<AuthContext, ApiError> {
    request
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))
}

async fn load_user(state: &AppState, user_id: &str) -> Result<Option<User>, ApiError> {
    state.users.find_by_id(user_id).await.map_err(|e| {
        tracing::error!("Failed to load user {}: {}", user_id, e);
        ApiError::bad_request("User not found")
    })
}

/// Verifies the bearer session token and attaches [`AuthContext`].
pub async fn require_signin(
    Extension(state): Extension<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request).ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    let claims = state.tokens.verify_session(token).map_err(|e| {
        tracing::debug!("Rejected session token: {:?}", e);
        ApiError::unauthorized("Unauthorized")
    })?;

    request.extensions_mut().insert(AuthContext {
        user_id: claims.user_id().to_string(),
    });
    Ok(next.run(request).await)
}

/// Loads the signed-in user and attaches it as [`User`].
pub async fn attach_profile(
    Extension(state): Extension<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let context = auth_context(&request)?;

    let user = load_user(&state, &context.user_id)
        .await?
        .ok_or_else(|| ApiError::bad_request("User not found"))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Admits only admins; attaches the loaded [`User`].
pub async fn require_admin(
    Extension(state): Extension<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let context = auth_context(&request)?;

    let user = load_user(&state, &context.user_id)
        .await?
        .ok_or_else(|| ApiError::bad_request("User not found"))?;

    if !user.is_admin() {
        tracing::warn!("User {} denied access to admin resource", user.id);
        return Err(ApiError::bad_request("Admin only resource. Access denied."));
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Admits only the poster of the link named by the `{id}` path segment.
/// Must run after [`attach_profile`].
pub async fn require_link_owner(
    Extension(state): Extension<AppState>,
    ApiPath(link_id): ApiPath<String>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<User>()
        .cloned()
        .ok_or_else(|| ApiError::bad_request("User not found"))?;

    let link = state.links.find_by_id(&link_id).await.map_err(|e| {
        tracing::error!("Failed to load link {}: {}", link_id, e);
        ApiError::bad_request("Could not find link")
    })?;

    let link = authorize_owner(link, "link", &user)?;

    request.extensions_mut().insert(link);
    Ok(next.run(request).await)
}
