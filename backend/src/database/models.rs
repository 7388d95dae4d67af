//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and retrieved
//! from the database, plus the request payloads for the category, link and
//! profile endpoints. Authentication payloads live in `auth::models`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Subscriber,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Subscriber => write!(f, "subscriber"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subscriber" => Ok(Role::Subscriber),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// A persisted, activated account.
///
/// Not `Serialize`. Responses go through [`UserProfile`] or [`UserSummary`],
/// which carry no credential material.
#[derive(Clone, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    pub salt: String,
    pub role: Role,
    /// Outstanding password reset token, empty when none.
    pub reset_password_link: String,
    /// Interest category ids.
    #[sqlx(skip)]
    pub categories: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            username: self.username.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            categories: self.categories.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Data for inserting an activated account. The store assigns `id` and timestamps.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    pub salt: String,
    pub role: Role,
}

/// Non-secret user fields returned at login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Non-secret user fields returned by the profile endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub categories: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub image_url: Option<String>,
    pub content: String,
    pub posted_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category fields embedded in link responses.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub image_url: Option<String>,
    pub content: String,
    pub posted_by: String,
}

#[derive(Debug, Clone)]
pub struct CategoryChanges {
    pub name: String,
    pub image_url: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum LinkType {
    #[default]
    Free,
    Paid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Medium {
    #[default]
    Video,
    Article,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostedBy {
    pub id: String,
    pub name: String,
}

/// A submitted resource with its poster and categories resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub title: String,
    pub url: String,
    pub slug: String,
    pub posted_by: PostedBy,
    pub categories: Vec<CategorySummary>,
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub medium: Medium,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    pub fn category_ids(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.id.clone()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct NewLink {
    pub title: String,
    pub url: String,
    pub posted_by: String,
    pub categories: Vec<String>,
    pub link_type: LinkType,
    pub medium: Medium,
}

#[derive(Debug, Clone)]
pub struct LinkChanges {
    pub title: String,
    pub url: String,
    pub categories: Vec<String>,
    pub link_type: LinkType,
    pub medium: Medium,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 32, message = "Name is required"))]
    pub name: String,
    /// URL of an image already uploaded to the asset store.
    #[validate(length(min = 1, message = "Image is required"))]
    pub image: String,
    #[validate(length(min = 20, message = "Content of minimum 20 characters is required"))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 32, message = "Name is required"))]
    pub name: String,
    pub image: Option<String>,
    #[validate(length(min = 20, message = "Content of minimum 20 characters is required"))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LinkRequest {
    #[validate(length(min = 1, max = 256, message = "Title is required"))]
    pub title: String,
    #[validate(
        length(min = 1, max = 256, message = "URL is required"),
        custom(function = "validate_web_url")
    )]
    pub url: String,
    #[validate(length(min = 1, message = "Category is required. Please pick a category."))]
    pub categories: Vec<String>,
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub medium: Medium,
}

/// Only absolute http(s) urls can be submitted as links.
fn validate_web_url(value: &str) -> Result<(), ValidationError> {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        _ => Err(ValidationError::new("url")
            .with_message("URL must be a valid http(s) address".into())),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClickCountRequest {
    #[serde(rename = "linkId")]
    #[validate(length(min = 1, message = "Link id is required"))]
    pub link_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 32, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}
