use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tower::ServiceExt;

use linkhub::api::build_router;
use linkhub::config::Config;
use linkhub::database::Database;
use linkhub::errors::NotificationError;
use linkhub::repositories::category_repository::SqliteCategoryRepository;
use linkhub::repositories::link_repository::SqliteLinkRepository;
use linkhub::repositories::user_repository::SqliteUserRepository;
use linkhub::services::email_service::{EmailTemplate, NotificationSink};
use linkhub::state::AppState;
use linkhub::utils::crypto::CredentialCodec;
use linkhub::utils::jwt::TokenService;

pub const PASSWORD: &str = "secret1";

// ── RecordingSink ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<(String, EmailTemplate)>>,
    pub fail: Mutex<bool>,
}

impl RecordingSink {
    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    /// Token of the most recent activation or reset email sent to `email`.
    pub fn token_for(&self, email: &str) -> Option<String> {
        let sent = self.sent.lock().unwrap();
        sent.iter()
            .rev()
            .filter(|(to, _)| to == email)
            .find_map(|(_, template)| match template {
                EmailTemplate::AccountActivation { token }
                | EmailTemplate::PasswordReset { token } => Some(token.clone()),
                EmailTemplate::LinkPublished { .. } => None,
            })
    }

    pub fn published_to(&self) -> Vec<String> {
        let sent = self.sent.lock().unwrap();
        sent.iter()
            .filter(|(_, template)| matches!(template, EmailTemplate::LinkPublished { .. }))
            .map(|(to, _)| to.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, to: &str, template: &EmailTemplate) -> Result<(), NotificationError> {
        if *self.fail.lock().unwrap() {
            return Err(NotificationError::Transport("connection refused".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), template.clone()));
        Ok(())
    }
}

// ── TestApp ──────────────────────────────────────────────────────────────────

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub sink: Arc<RecordingSink>,
    pub tokens: Arc<TokenService>,
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        max_connections: 1,
        acquire_timeout_seconds: 30,
        jwt_secret: "session-secret".to_string(),
        jwt_account_activation: "activation-secret".to_string(),
        jwt_reset_password: "reset-secret".to_string(),
        server_port: 0,
        client_url: "http://localhost:3000".to_string(),
        bcrypt_cost: 4,
        smtp_host: None,
        smtp_port: 587,
        smtp_username: None,
        smtp_password: None,
        email_from: None,
        email_from_name: "Linkhub".to_string(),
        email_reply_to: None,
    }
}

pub async fn spawn_app() -> TestApp {
    let config = test_config();
    let db = Database::new(&config).await.unwrap();
    db.migrate().await.unwrap();
    let pool = db.pool().clone();

    let sink = Arc::new(RecordingSink::default());
    let tokens = Arc::new(TokenService::from_config(&config));

    let state = AppState {
        users: Arc::new(SqliteUserRepository::new(pool.clone())),
        links: Arc::new(SqliteLinkRepository::new(pool.clone())),
        categories: Arc::new(SqliteCategoryRepository::new(pool.clone())),
        notifier: sink.clone(),
        tokens: tokens.clone(),
        credentials: CredentialCodec::new(config.bcrypt_cost),
        client_url: config.client_url.clone(),
    };

    TestApp {
        router: build_router(state),
        pool,
        sink,
        tokens,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Registers and activates an account, returning its session token.
    pub async fn signed_up(&self, name: &str, email: &str) -> String {
        let (status, _) = self
            .post(
                "/api/register",
                None,
                json!({ "name": name, "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let token = self.sink.token_for(email).unwrap();
        let (status, _) = self
            .post("/api/register/activate", None, json!({ "token": token }))
            .await;
        assert_eq!(status, StatusCode::OK);

        self.login(email, PASSWORD).await
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/api/login",
                None,
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Signs up an admin account and returns its session token.
    pub async fn admin(&self, email: &str) -> String {
        let token = self.signed_up("Admin", email).await;
        sqlx::query("UPDATE users SET role = 'admin' WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await
            .unwrap();
        token
    }

    /// Creates a category as `admin_token` and returns its id.
    pub async fn category(&self, admin_token: &str, name: &str) -> String {
        let (status, body) = self
            .post(
                "/api/category",
                Some(admin_token),
                json!({
                    "name": name,
                    "image": "https://img.example.com/cat.png",
                    "content": "A category with enough descriptive content."
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "category create failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }

    /// Submits a link as `token` and returns its id.
    pub async fn link(&self, token: &str, url: &str, category_id: &str) -> String {
        let (status, body) = self
            .post(
                "/api/link",
                Some(token),
                json!({
                    "title": "A resource",
                    "url": url,
                    "categories": [category_id],
                    "type": "Free",
                    "medium": "Article"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "link create failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }
}
