//! Database repository for user management operations.
//!
//! Flows only see the [`UserRepository`] trait; [`SqliteUserRepository`] is
//! the production implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::database::models::{NewUser, User};
use crate::errors::StoreError;

/// Persistence operations the authentication and profile flows depend on.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Finds the user holding exactly this reset token. An empty token never matches.
    async fn find_by_reset_token(&self, token: &str) -> Result<Option<User>, StoreError>;

    /// Inserts an activated account.
    ///
    /// Fails with [`StoreError::DuplicateKey`] when the email or username is taken.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// Persists every mutable field of `user`, including its interest categories.
    async fn update(&self, user: &User) -> Result<User, StoreError>;

    /// Users whose interests intersect `category_ids`.
    async fn find_interested_in(&self, category_ids: &[String]) -> Result<Vec<User>, StoreError>;
}

const USER_COLUMNS: &str = "u.id, u.username, u.name, u.email, u.hashed_password, u.salt, \
     u.role, u.reset_password_link, u.created_at, u.updated_at";

/// Repository for user database operations.
#[derive(Clone)]
pub struct SqliteUserRepository {
    /// Shared SQLite connection pool
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Creates a new SqliteUserRepository instance.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.{column} = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        match user {
            Some(user) => Ok(Some(self.with_categories(user).await?)),
            None => Ok(None),
        }
    }

    async fn with_categories(&self, mut user: User) -> Result<User, StoreError> {
        user.categories = sqlx::query_scalar::<_, String>(
            "SELECT category_id FROM user_categories WHERE user_id = ? ORDER BY category_id",
        )
        .bind(&user.id)
        .fetch_all(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_one("email", email).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        self.find_one("id", id).await
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        if token.is_empty() {
            return Ok(None);
        }
        self.find_one("reset_password_link", token).await
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let id = Uuid::now_v7().to_string();
        let now: DateTime<Utc> = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, username, name, email, hashed_password, salt, role, reset_password_link, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, '', ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(&user.salt)
        .bind(user.role)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id,
            username: user.username,
            name: user.name,
            email: user.email,
            hashed_password: user.hashed_password,
            salt: user.salt,
            role: user.role,
            reset_password_link: String::new(),
            categories: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn update(&self, user: &User) -> Result<User, StoreError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE users
            SET name = ?, email = ?, hashed_password = ?, salt = ?, role = ?,
                reset_password_link = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(&user.salt)
        .bind(user.role)
        .bind(&user.reset_password_link)
        .bind(now)
        .bind(&user.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM user_categories WHERE user_id = ?")
            .bind(&user.id)
            .execute(&mut *tx)
            .await?;

        for category_id in &user.categories {
            sqlx::query("INSERT OR IGNORE INTO user_categories (user_id, category_id) VALUES (?, ?)")
                .bind(&user.id)
                .bind(category_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        let mut updated = user.clone();
        updated.updated_at = now;
        Ok(updated)
    }

    async fn find_interested_in(&self, category_ids: &[String]) -> Result<Vec<User>, StoreError> {
        if category_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT DISTINCT {USER_COLUMNS} FROM users u \
             JOIN user_categories uc ON uc.user_id = u.id \
             WHERE uc.category_id IN ("
        ));
        let mut ids = query.separated(", ");
        for id in category_ids {
            ids.push_bind(id.as_str());
        }
        ids.push_unseparated(") ORDER BY u.created_at");

        let users = query.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(users)
    }
}
