//! User business logic service.
//!
//! Handles profile reads and self-service profile updates.

use serde::Serialize;

use crate::database::models::{Link, UpdateUserRequest, User, UserProfile};
use crate::errors::ServiceResult;
use crate::repositories::category_repository::CategoryRepository;
use crate::repositories::link_repository::LinkRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::category_service::resolve_categories;
use crate::state::AppState;
use crate::utils::crypto::CredentialCodec;

/// Profile payload: the user projection plus everything they posted.
#[derive(Debug, Serialize)]
pub struct UserWithLinks {
    pub user: UserProfile,
    pub links: Vec<Link>,
}

pub struct UserService<'a> {
    /// User persistence
    users: &'a dyn UserRepository,
    links: &'a dyn LinkRepository,
    categories: &'a dyn CategoryRepository,
    credentials: &'a CredentialCodec,
}

impl<'a> UserService<'a> {
    /// Creates a new UserService instance.
    pub fn new(
        users: &'a dyn UserRepository,
        links: &'a dyn LinkRepository,
        categories: &'a dyn CategoryRepository,
        credentials: &'a CredentialCodec,
    ) -> Self {
        Self {
            users,
            links,
            categories,
            credentials,
        }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(
            state.users.as_ref(),
            state.links.as_ref(),
            state.categories.as_ref(),
            &state.credentials,
        )
    }

    /// Returns the user's profile and links, newest first.
    pub async fn profile_with_links(&self, user: &User) -> ServiceResult<UserWithLinks> {
        let links = self.links.list_by_poster(&user.id).await?;
        Ok(UserWithLinks {
            user: user.profile(),
            links,
        })
    }

    /// Updates name, interest categories and optionally the password.
    ///
    /// A new password regenerates the salt along with the digest.
    pub async fn update_profile(
        &self,
        mut user: User,
        request: UpdateUserRequest,
    ) -> ServiceResult<UserProfile> {
        let categories = resolve_categories(self.categories, &request.categories).await?;

        user.name = request.name.trim().to_string();
        user.categories = categories.into_iter().map(|c| c.id).collect();

        if let Some(password) = request.password.as_deref() {
            let credential = self.credentials.set_password(password);
            user.hashed_password = credential.hash;
            user.salt = credential.salt;
        }

        let updated = self.users.update(&user).await?;
        tracing::info!("User {} updated their profile", updated.id);
        Ok(updated.profile())
    }
}
