//! Shared application state injected into every handler and middleware.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::repositories::category_repository::{CategoryRepository, SqliteCategoryRepository};
use crate::repositories::link_repository::{LinkRepository, SqliteLinkRepository};
use crate::repositories::user_repository::{SqliteUserRepository, UserRepository};
use crate::services::email_service::{NotificationSink, notification_sink_from_config};
use crate::utils::crypto::CredentialCodec;
use crate::utils::jwt::TokenService;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub links: Arc<dyn LinkRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub notifier: Arc<dyn NotificationSink>,
    pub tokens: Arc<TokenService>,
    pub credentials: CredentialCodec,
    /// Allowed CORS origin and base of every emailed link.
    pub client_url: String,
}

impl AppState {
    /// Wires the SQLite repositories and the configured notification sink.
    pub fn from_config(config: &Config, pool: SqlitePool) -> Self {
        Self {
            users: Arc::new(SqliteUserRepository::new(pool.clone())),
            links: Arc::new(SqliteLinkRepository::new(pool.clone())),
            categories: Arc::new(SqliteCategoryRepository::new(pool)),
            notifier: notification_sink_from_config(config),
            tokens: Arc::new(TokenService::from_config(config)),
            credentials: CredentialCodec::new(config.bcrypt_cost),
            client_url: config.client_url.clone(),
        }
    }
}
