//! Link business logic service.
//!
//! Handles submission, listing, click counting and popularity ranking of
//! links, plus the "link published" emails sent to interested users.

use futures::future::join_all;

use crate::database::models::{Link, LinkChanges, LinkRequest, NewLink, User};
use crate::errors::{ServiceError, ServiceResult, StoreError};
use crate::repositories::category_repository::CategoryRepository;
use crate::repositories::link_repository::LinkRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::category_service::resolve_categories;
use crate::services::email_service::{EmailTemplate, NotificationSink};
use crate::state::AppState;

/// Number of links returned by the popularity endpoints.
pub const POPULAR_LIMIT: i64 = 3;

pub struct LinkService<'a> {
    links: &'a dyn LinkRepository,
    categories: &'a dyn CategoryRepository,
    users: &'a dyn UserRepository,
    notifier: &'a dyn NotificationSink,
}

impl<'a> LinkService<'a> {
    pub fn new(
        links: &'a dyn LinkRepository,
        categories: &'a dyn CategoryRepository,
        users: &'a dyn UserRepository,
        notifier: &'a dyn NotificationSink,
    ) -> Self {
        Self {
            links,
            categories,
            users,
            notifier,
        }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(
            state.links.as_ref(),
            state.categories.as_ref(),
            state.users.as_ref(),
            state.notifier.as_ref(),
        )
    }

    fn duplicate_url(url: &str) -> impl FnOnce(StoreError) -> ServiceError + '_ {
        move |e| match e {
            StoreError::DuplicateKey(_) => ServiceError::already_exists("Link", url),
            other => ServiceError::from(other),
        }
    }

    /// Creates a link posted by `poster`.
    ///
    /// # Errors
    /// - `NotFound` if a category does not exist
    /// - `AlreadyExists` if the url was already submitted
    pub async fn create(&self, request: LinkRequest, poster: &User) -> ServiceResult<Link> {
        let categories = resolve_categories(self.categories, &request.categories).await?;
        let url = request.url.trim().to_string();

        let link = self
            .links
            .create(NewLink {
                title: request.title.trim().to_string(),
                url: url.clone(),
                posted_by: poster.id.clone(),
                categories: categories.into_iter().map(|c| c.id).collect(),
                link_type: request.link_type,
                medium: request.medium,
            })
            .await
            .map_err(Self::duplicate_url(&url))?;

        tracing::info!("Link {} created by {}", link.id, poster.id);
        Ok(link)
    }

    /// Emails every user interested in one of the link's categories.
    ///
    /// Individual failures are logged; returns the number of emails delivered.
    pub async fn notify_interested_users(&self, link: &Link) -> ServiceResult<usize> {
        let recipients = self.users.find_interested_in(&link.category_ids()).await?;
        if recipients.is_empty() {
            return Ok(0);
        }

        let template = EmailTemplate::LinkPublished {
            title: link.title.clone(),
            url: link.url.clone(),
            categories: link.categories.iter().map(|c| c.name.clone()).collect(),
        };

        let results = join_all(
            recipients
                .iter()
                .map(|user| self.notifier.send(&user.email, &template)),
        )
        .await;

        let mut delivered = 0;
        for (user, result) in recipients.iter().zip(results) {
            match result {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(
                    "Failed to notify {} about link {}: {}",
                    user.email,
                    link.id,
                    e
                ),
            }
        }

        tracing::info!(
            "Link {} announced to {}/{} interested users",
            link.id,
            delivered,
            recipients.len()
        );
        Ok(delivered)
    }

    pub async fn list(&self, limit: i64, skip: i64) -> ServiceResult<Vec<Link>> {
        Ok(self.links.list(limit, skip).await?)
    }

    pub async fn read(&self, id: &str) -> ServiceResult<Link> {
        self.links
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Link", id))
    }

    pub async fn update(&self, id: &str, request: LinkRequest) -> ServiceResult<Link> {
        let categories = resolve_categories(self.categories, &request.categories).await?;
        let url = request.url.trim().to_string();

        let changes = LinkChanges {
            title: request.title.trim().to_string(),
            url: url.clone(),
            categories: categories.into_iter().map(|c| c.id).collect(),
            link_type: request.link_type,
            medium: request.medium,
        };

        self.links
            .update(id, changes)
            .await
            .map_err(Self::duplicate_url(&url))?
            .ok_or_else(|| ServiceError::not_found("Link", id))
    }

    pub async fn remove(&self, id: &str) -> ServiceResult<()> {
        if !self.links.delete(id).await? {
            return Err(ServiceError::not_found("Link", id));
        }
        tracing::info!("Link {} deleted", id);
        Ok(())
    }

    /// Counts one click and returns the updated link.
    pub async fn click(&self, id: &str) -> ServiceResult<Link> {
        self.links
            .increment_clicks(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Link", id))
    }

    pub async fn popular(&self) -> ServiceResult<Vec<Link>> {
        Ok(self.links.popular(POPULAR_LIMIT).await?)
    }

    pub async fn popular_in_category(&self, slug: &str) -> ServiceResult<Vec<Link>> {
        let category = self
            .categories
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ServiceError::not_found("Category", slug))?;

        Ok(self
            .links
            .popular_in_category(&category.id, POPULAR_LIMIT)
            .await?)
    }
}
