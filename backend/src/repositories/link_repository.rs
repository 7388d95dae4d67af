//! Database repository for link operations.
//!
//! Links are stored with their poster id and a join table of categories; every
//! read resolves both into the embedded [`PostedBy`] and [`CategorySummary`]
//! values so callers always see a complete [`Link`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::database::models::{
    CategorySummary, Link, LinkChanges, LinkType, Medium, NewLink, PostedBy,
};
use crate::errors::StoreError;

#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Fails with [`StoreError::DuplicateKey`] when the url was already submitted.
    async fn create(&self, link: NewLink) -> Result<Link, StoreError>;

    /// Newest first.
    async fn list(&self, limit: i64, skip: i64) -> Result<Vec<Link>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Link>, StoreError>;

    /// Replaces the link fields and its categories. `None` when the id is unknown.
    async fn update(&self, id: &str, changes: LinkChanges) -> Result<Option<Link>, StoreError>;

    /// Returns `false` when the id is unknown.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Adds one to the click counter and returns the updated link.
    async fn increment_clicks(&self, id: &str) -> Result<Option<Link>, StoreError>;

    /// Most clicked links across all categories.
    async fn popular(&self, limit: i64) -> Result<Vec<Link>, StoreError>;

    /// Most clicked links tagged with `category_id`.
    async fn popular_in_category(
        &self,
        category_id: &str,
        limit: i64,
    ) -> Result<Vec<Link>, StoreError>;

    async fn list_by_poster(&self, user_id: &str) -> Result<Vec<Link>, StoreError>;

    /// Newest first.
    async fn list_by_category(
        &self,
        category_id: &str,
        limit: i64,
        skip: i64,
    ) -> Result<Vec<Link>, StoreError>;
}

const LINK_SELECT: &str = "SELECT l.id, l.title, l.url, l.slug, l.posted_by, \
     u.name AS posted_by_name, l.link_type, l.medium, l.clicks, l.created_at, l.updated_at \
     FROM links l JOIN users u ON u.id = l.posted_by";

#[derive(FromRow)]
struct LinkRow {
    id: String,
    title: String,
    url: String,
    slug: String,
    posted_by: String,
    posted_by_name: String,
    link_type: LinkType,
    medium: Medium,
    clicks: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LinkRow {
    fn into_link(self, categories: Vec<CategorySummary>) -> Link {
        Link {
            id: self.id,
            title: self.title,
            url: self.url,
            slug: self.slug,
            posted_by: PostedBy {
                id: self.posted_by,
                name: self.posted_by_name,
            },
            categories,
            link_type: self.link_type,
            medium: self.medium,
            clicks: self.clicks,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Repository for link database operations.
#[derive(Clone)]
pub struct SqliteLinkRepository {
    pool: SqlitePool,
}

impl SqliteLinkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn categories_of(&self, link_id: &str) -> Result<Vec<CategorySummary>, StoreError> {
        let categories = sqlx::query_as::<_, CategorySummary>(
            r#"
            SELECT c.id, c.name, c.slug
            FROM categories c
            JOIN link_categories lc ON lc.category_id = c.id
            WHERE lc.link_id = ?
            ORDER BY c.name
            "#,
        )
        .bind(link_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    /// Resolves the categories of every row, preserving row order.
    async fn hydrate(&self, rows: Vec<LinkRow>) -> Result<Vec<Link>, StoreError> {
        let mut links = Vec::with_capacity(rows.len());
        for row in rows {
            let categories = self.categories_of(&row.id).await?;
            links.push(row.into_link(categories));
        }
        Ok(links)
    }

    async fn hydrate_one(&self, row: Option<LinkRow>) -> Result<Option<Link>, StoreError> {
        match row {
            Some(row) => {
                let categories = self.categories_of(&row.id).await?;
                Ok(Some(row.into_link(categories)))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl LinkRepository for SqliteLinkRepository {
    /// Inserts the link and its category associations in one transaction.
    ///
    /// # Arguments
    /// * `link` - Link data; the url doubles as the unique slug
    ///
    /// # Returns
    /// The stored link with poster and categories resolved
    async fn create(&self, link: NewLink) -> Result<Link, StoreError> {
        let id = Uuid::now_v7().to_string();
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO links (id, title, url, slug, posted_by, link_type, medium, clicks, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&link.title)
        .bind(&link.url)
        .bind(&link.url)
        .bind(&link.posted_by)
        .bind(link.link_type)
        .bind(link.medium)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for category_id in &link.categories {
            sqlx::query("INSERT OR IGNORE INTO link_categories (link_id, category_id) VALUES (?, ?)")
                .bind(&id)
                .bind(category_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.find_by_id(&id)
            .await?
            .ok_or(StoreError::Backend(sqlx::Error::RowNotFound))
    }

    async fn list(&self, limit: i64, skip: i64) -> Result<Vec<Link>, StoreError> {
        let sql = format!("{LINK_SELECT} ORDER BY l.created_at DESC, l.id DESC LIMIT ? OFFSET ?");
        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(rows).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Link>, StoreError> {
        let sql = format!("{LINK_SELECT} WHERE l.id = ?");
        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        self.hydrate_one(row).await
    }

    async fn update(&self, id: &str, changes: LinkChanges) -> Result<Option<Link>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let rows_affected = sqlx::query(
            r#"
            UPDATE links
            SET title = ?, url = ?, slug = ?, link_type = ?, medium = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&changes.title)
        .bind(&changes.url)
        .bind(&changes.url)
        .bind(changes.link_type)
        .bind(changes.medium)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query("DELETE FROM link_categories WHERE link_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for category_id in &changes.categories {
            sqlx::query("INSERT OR IGNORE INTO link_categories (link_id, category_id) VALUES (?, ?)")
                .bind(id)
                .bind(category_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        self.find_by_id(id).await
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query("DELETE FROM links WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows_affected > 0)
    }

    async fn increment_clicks(&self, id: &str) -> Result<Option<Link>, StoreError> {
        let rows_affected = sqlx::query("UPDATE links SET clicks = clicks + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn popular(&self, limit: i64) -> Result<Vec<Link>, StoreError> {
        let sql = format!("{LINK_SELECT} ORDER BY l.clicks DESC, l.created_at DESC LIMIT ?");
        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(rows).await
    }

    async fn popular_in_category(
        &self,
        category_id: &str,
        limit: i64,
    ) -> Result<Vec<Link>, StoreError> {
        let sql = format!(
            "{LINK_SELECT} JOIN link_categories lc ON lc.link_id = l.id \
             WHERE lc.category_id = ? ORDER BY l.clicks DESC, l.created_at DESC LIMIT ?"
        );
        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(category_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(rows).await
    }

    async fn list_by_poster(&self, user_id: &str) -> Result<Vec<Link>, StoreError> {
        let sql = format!("{LINK_SELECT} WHERE l.posted_by = ? ORDER BY l.created_at DESC, l.id DESC");
        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(rows).await
    }

    async fn list_by_category(
        &self,
        category_id: &str,
        limit: i64,
        skip: i64,
    ) -> Result<Vec<Link>, StoreError> {
        let sql = format!(
            "{LINK_SELECT} JOIN link_categories lc ON lc.link_id = l.id \
             WHERE lc.category_id = ? ORDER BY l.created_at DESC, l.id DESC LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(category_id)
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(rows).await
    }
}
