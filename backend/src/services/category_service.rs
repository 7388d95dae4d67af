//! Category business logic service.
//!
//! Categories are created and edited by admins; the slug is derived from the
//! name once at creation and never changes afterwards.

use serde::Serialize;

use crate::api::common::PaginationFilter;
use crate::database::models::{
    Category, CategoryChanges, CreateCategoryRequest, Link, NewCategory, UpdateCategoryRequest,
    User,
};
use crate::errors::{ServiceError, ServiceResult, StoreError};
use crate::repositories::category_repository::CategoryRepository;
use crate::repositories::link_repository::LinkRepository;
use crate::state::AppState;
use crate::utils::slug::slugify;

/// A category together with one page of its links.
#[derive(Debug, Serialize)]
pub struct CategoryWithLinks {
    pub category: Category,
    pub links: Vec<Link>,
}

/// Resolves `ids` to existing categories, dropping duplicates.
///
/// # Errors
/// `NotFound` naming the first id with no category.
pub async fn resolve_categories(
    categories: &dyn CategoryRepository,
    ids: &[String],
) -> ServiceResult<Vec<Category>> {
    let mut unique: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(id.clone());
        }
    }

    let found = categories.find_by_ids(&unique).await?;
    if let Some(missing) = unique.iter().find(|id| !found.iter().any(|c| &c.id == *id)) {
        return Err(ServiceError::not_found("Category", missing));
    }

    Ok(found)
}

pub struct CategoryService<'a> {
    categories: &'a dyn CategoryRepository,
    links: &'a dyn LinkRepository,
}

impl<'a> CategoryService<'a> {
    pub fn new(categories: &'a dyn CategoryRepository, links: &'a dyn LinkRepository) -> Self {
        Self { categories, links }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(state.categories.as_ref(), state.links.as_ref())
    }

    /// Creates a category posted by `poster`.
    ///
    /// # Errors
    /// - `Validation` if the name yields an empty slug
    /// - `AlreadyExists` if another category has the same slug
    pub async fn create(
        &self,
        request: CreateCategoryRequest,
        poster: &User,
    ) -> ServiceResult<Category> {
        let name = request.name.trim().to_string();
        let slug = slugify(&name)
            .ok_or_else(|| ServiceError::validation("Name must contain letters or digits"))?;

        let category = self
            .categories
            .create(NewCategory {
                name,
                slug: slug.clone(),
                image_url: Some(request.image),
                content: request.content,
                posted_by: poster.id.clone(),
            })
            .await
            .map_err(|e| match e {
                StoreError::DuplicateKey(_) => ServiceError::already_exists("Category", &slug),
                other => ServiceError::from(other),
            })?;

        tracing::info!("Category {} created by {}", category.slug, poster.id);
        Ok(category)
    }

    pub async fn list(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.categories.list().await?)
    }

    /// Returns the category and its newest links.
    pub async fn read(
        &self,
        slug: &str,
        pagination: &PaginationFilter,
    ) -> ServiceResult<CategoryWithLinks> {
        let category = self
            .categories
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ServiceError::not_found("Category", slug))?;

        let links = self
            .links
            .list_by_category(&category.id, pagination.limit(), pagination.skip())
            .await?;

        Ok(CategoryWithLinks { category, links })
    }

    pub async fn update(
        &self,
        slug: &str,
        request: UpdateCategoryRequest,
    ) -> ServiceResult<Category> {
        let changes = CategoryChanges {
            name: request.name.trim().to_string(),
            image_url: request.image.filter(|image| !image.trim().is_empty()),
            content: request.content,
        };

        self.categories
            .update(slug, changes)
            .await?
            .ok_or_else(|| ServiceError::not_found("Category", slug))
    }

    pub async fn remove(&self, slug: &str) -> ServiceResult<()> {
        if !self.categories.delete(slug).await? {
            return Err(ServiceError::not_found("Category", slug));
        }
        tracing::info!("Category {} deleted", slug);
        Ok(())
    }
}
