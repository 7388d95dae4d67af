use axum::http::StatusCode;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;

use linkhub::utils::jwt::SessionClaims;

use crate::helpers::{spawn_app, test_config};

#[tokio::test]
async fn should_require_session_for_profile() {
    let app = spawn_app().await;

    let (status, _) = app.get("/api/user", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/user", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_expired_session_token() {
    let app = spawn_app().await;
    let token = app.signed_up("Ann", "ann@x.com").await;
    let user_id = app.tokens.verify_session(&token).unwrap().sub;

    let now = chrono::Utc::now().timestamp() as usize;
    let claims = SessionClaims {
        sub: user_id,
        iat: now - 7200,
        exp: now - 60,
    };
    let expired = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(test_config().jwt_secret.as_bytes()),
    )
    .unwrap();

    let (status, body) = app.get("/api/user", Some(&expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = app.get("/api/user", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn should_return_profile_with_links() {
    let app = spawn_app().await;
    let admin = app.admin("admin@x.com").await;
    let category = app.category(&admin, "Rust").await;
    let token = app.signed_up("Ann", "ann@x.com").await;
    app.link(&token, "https://doc.rust-lang.org/book", &category)
        .await;

    let (status, body) = app.get("/api/user", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "ann@x.com");
    assert!(body["user"].get("hashed_password").is_none());
    assert!(body["user"].get("salt").is_none());
    assert_eq!(body["links"].as_array().unwrap().len(), 1);
    assert_eq!(body["links"][0]["posted_by"]["name"], "Ann");
}

#[tokio::test]
async fn should_report_missing_user_for_valid_session() {
    let app = spawn_app().await;
    let token = app.signed_up("Ann", "ann@x.com").await;
    sqlx::query("DELETE FROM users")
        .execute(&app.pool)
        .await
        .unwrap();

    let (status, body) = app.get("/api/user", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn should_restrict_admin_profile() {
    let app = spawn_app().await;
    let token = app.signed_up("Ann", "ann@x.com").await;
    let admin = app.admin("admin@x.com").await;

    let (status, body) = app.get("/api/admin", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Admin only resource. Access denied.");

    let (status, body) = app.get("/api/admin", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn should_update_profile_and_password() {
    let app = spawn_app().await;
    let admin = app.admin("admin@x.com").await;
    let category = app.category(&admin, "Rust").await;
    let token = app.signed_up("Ann", "ann@x.com").await;

    let (status, body) = app
        .put(
            "/api/user",
            Some(&token),
            json!({ "name": "Ann B", "password": "secret9", "categories": [category] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ann B");
    assert_eq!(body["categories"], json!([category]));

    app.login("ann@x.com", "secret9").await;

    let (status, _) = app
        .put(
            "/api/user",
            Some(&token),
            json!({ "name": "Ann B", "categories": ["no-such-category"] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
