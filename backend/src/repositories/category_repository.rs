//! Database repository for category operations.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::database::models::{Category, CategoryChanges, NewCategory};
use crate::errors::StoreError;

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Fails with [`StoreError::DuplicateKey`] when the slug is taken.
    async fn create(&self, category: NewCategory) -> Result<Category, StoreError>;

    async fn list(&self) -> Result<Vec<Category>, StoreError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError>;

    /// Returns the categories that exist among `ids`.
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Category>, StoreError>;

    /// Returns `None` when no category has this slug.
    async fn update(
        &self,
        slug: &str,
        changes: CategoryChanges,
    ) -> Result<Option<Category>, StoreError>;

    /// Returns `false` when no category has this slug.
    async fn delete(&self, slug: &str) -> Result<bool, StoreError>;
}

const CATEGORY_COLUMNS: &str =
    "id, name, slug, image_url, content, posted_by, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteCategoryRepository {
    pool: SqlitePool,
}

impl SqliteCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn create(&self, category: NewCategory) -> Result<Category, StoreError> {
        let id = Uuid::now_v7().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, slug, image_url, content, posted_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.image_url)
        .bind(&category.content)
        .bind(&category.posted_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Category {
            id,
            name: category.name,
            slug: category.slug,
            image_url: category.image_url,
            content: category.content,
            posted_by: category.posted_by,
            created_at: now,
            updated_at: now,
        })
    }

    async fn list(&self) -> Result<Vec<Category>, StoreError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name");
        let categories = sqlx::query_as::<_, Category>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = ?");
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Category>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id IN ("
        ));
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(") ORDER BY name");

        let categories = query
            .build_query_as::<Category>()
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn update(
        &self,
        slug: &str,
        changes: CategoryChanges,
    ) -> Result<Option<Category>, StoreError> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE categories
            SET name = ?, image_url = COALESCE(?, image_url), content = ?, updated_at = ?
            WHERE slug = ?
            "#,
        )
        .bind(&changes.name)
        .bind(&changes.image_url)
        .bind(&changes.content)
        .bind(Utc::now())
        .bind(slug)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_slug(slug).await
    }

    async fn delete(&self, slug: &str) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query("DELETE FROM categories WHERE slug = ?")
            .bind(slug)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows_affected > 0)
    }
}
