use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{PASSWORD, spawn_app};

// ── register / activate ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_persist_user_only_after_activation() {
    let app = spawn_app().await;

    let (status, body) = app
        .post(
            "/api/register",
            None,
            json!({ "name": "Ann", "email": "ann@x.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Email has been sent to ann@x.com. Follow the instructions to complete your registration."
    );

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);

    let token = app.sink.token_for("ann@x.com").unwrap();
    let (status, body) = app
        .post("/api/register/activate", None, json!({ "token": token }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Registration was successful. Please proceed to login."
    );

    let (username, role, email): (String, String, String) =
        sqlx::query_as("SELECT username, role, email FROM users")
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert!(!username.is_empty());
    assert_eq!(username, username.to_lowercase());
    assert_eq!(role, "subscriber");
    assert_eq!(email, "ann@x.com");
}

#[tokio::test]
async fn should_reject_registration_for_taken_email() {
    let app = spawn_app().await;
    app.signed_up("Ann", "ann@x.com").await;

    let (status, body) = app
        .post(
            "/api/register",
            None,
            json!({ "name": "Other", "email": "ANN@x.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email is taken. Please choose another email.");
}

#[tokio::test]
async fn should_activate_only_one_of_two_pending_registrations() {
    let app = spawn_app().await;
    let register = json!({ "name": "Ann", "email": "ann@x.com", "password": PASSWORD });

    app.post("/api/register", None, register.clone()).await;
    let first = app.sink.token_for("ann@x.com").unwrap();
    app.post(
        "/api/register",
        None,
        json!({ "name": "Ann Two", "email": "ann@x.com", "password": "secret2" }),
    )
    .await;
    let second = app.sink.token_for("ann@x.com").unwrap();

    let (status, _) = app
        .post("/api/register/activate", None, json!({ "token": first }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post("/api/register/activate", None, json!({ "token": second }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Email is taken. Please choose another email.");
}

#[tokio::test]
async fn should_reject_tampered_activation_token() {
    let app = spawn_app().await;

    let (status, body) = app
        .post(
            "/api/register/activate",
            None,
            json!({ "token": "eyJhbGciOiJIUzI1NiJ9.e30.invalid" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Expired or invalid link. Please try again");
}

#[tokio::test]
async fn should_report_unsent_activation_email() {
    let app = spawn_app().await;
    app.sink.set_failing(true);

    let (status, body) = app
        .post(
            "/api/register",
            None,
            json!({ "name": "Ann", "email": "ann@x.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["error"],
        "We could not verify your email. Please try again."
    );
}

#[tokio::test]
async fn should_validate_register_payload() {
    let app = spawn_app().await;

    let (status, body) = app
        .post(
            "/api/register",
            None,
            json!({ "name": "Ann", "email": "ann@x.com", "password": "abc" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Password must be at least 6 characters long");

    let (status, body) = app
        .post("/api/register", None, json!({ "name": "Ann" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}

// ── login ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_login_without_exposing_credentials() {
    let app = spawn_app().await;
    app.signed_up("Ann", "ann@x.com").await;

    let (status, body) = app
        .post(
            "/api/login",
            None,
            json!({ "email": "ann@x.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let token = body["token"].as_str().unwrap();
    let claims = app.tokens.verify_session(token).unwrap();
    assert_eq!(claims.user_id(), body["user"]["id"].as_str().unwrap());

    let user = body["user"].as_object().unwrap();
    assert_eq!(user["name"], "Ann");
    assert_eq!(user["email"], "ann@x.com");
    assert_eq!(user["role"], "subscriber");
    assert_eq!(user.len(), 4);
}

#[tokio::test]
async fn should_reject_wrong_password() {
    let app = spawn_app().await;
    app.signed_up("Ann", "ann@x.com").await;

    let (status, body) = app
        .post(
            "/api/login",
            None,
            json!({ "email": "ann@x.com", "password": "not-the-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email and password do not match");
}

#[tokio::test]
async fn should_reject_login_for_unknown_email() {
    let app = spawn_app().await;

    let (status, body) = app
        .post(
            "/api/login",
            None,
            json!({ "email": "bob@x.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "No user matching this email was found in the database. Please register and try again."
    );
}

// ── forgot / reset password ──────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_forgot_password_for_unknown_email() {
    let app = spawn_app().await;

    let (status, body) = app
        .post(
            "/api/forgot-password",
            None,
            json!({ "email": "nobody@x.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "No user associated with this email found in the database"
    );
}

#[tokio::test]
async fn should_reset_password_once() {
    let app = spawn_app().await;
    app.signed_up("Ann", "ann@x.com").await;

    let (status, body) = app
        .post(
            "/api/forgot-password",
            None,
            json!({ "email": "ann@x.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Email has been sent to ann@x.com. Click on the link to reset your password"
    );
    let reset = app.sink.token_for("ann@x.com").unwrap();

    let request = json!({ "resetPasswordLink": reset, "newPassword": "secret2" });
    let (status, body) = app
        .post("/api/reset-password", None, request.clone())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Your password has been updated. You may proceed to login with your new credentials"
    );

    app.login("ann@x.com", "secret2").await;
    let (status, _) = app
        .post(
            "/api/login",
            None,
            json!({ "email": "ann@x.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.post("/api/reset-password", None, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Expired or invalid link. Please try again");
}

#[tokio::test]
async fn should_keep_reset_token_when_email_fails() {
    let app = spawn_app().await;
    app.signed_up("Ann", "ann@x.com").await;
    app.sink.set_failing(true);

    let (status, body) = app
        .post(
            "/api/forgot-password",
            None,
            json!({ "email": "ann@x.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["error"],
        "We could not verify your email. Please try again later."
    );

    let stored: String = sqlx::query_scalar("SELECT reset_password_link FROM users")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert!(!stored.is_empty());
}

#[tokio::test]
async fn should_reject_session_token_as_reset_token() {
    let app = spawn_app().await;
    let session = app.signed_up("Ann", "ann@x.com").await;

    let (status, _) = app
        .post(
            "/api/reset-password",
            None,
            json!({ "resetPasswordLink": session, "newPassword": "secret2" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
