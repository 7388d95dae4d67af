use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::spawn_app;

#[tokio::test]
async fn should_create_category_with_slug() {
    let app = spawn_app().await;
    let admin = app.admin("admin@x.com").await;
    app.category(&admin, "Web Development").await;

    let (status, body) = app.get("/api/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["slug"], "web-development");
    assert_eq!(body[0]["image_url"], "https://img.example.com/cat.png");
}

#[tokio::test]
async fn should_restrict_category_writes_to_admins() {
    let app = spawn_app().await;
    let token = app.signed_up("Ann", "ann@x.com").await;

    let (status, body) = app
        .post(
            "/api/category",
            Some(&token),
            json!({
                "name": "Rust",
                "image": "https://img.example.com/rust.png",
                "content": "Everything about the Rust language."
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Admin only resource. Access denied.");

    let (status, _) = app.delete("/api/category/rust", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_short_content_and_duplicates() {
    let app = spawn_app().await;
    let admin = app.admin("admin@x.com").await;

    let (status, body) = app
        .post(
            "/api/category",
            Some(&admin),
            json!({ "name": "Rust", "image": "https://img.example.com/r.png", "content": "short" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Content of minimum 20 characters is required");

    app.category(&admin, "Rust").await;
    let (status, body) = app
        .post(
            "/api/category",
            Some(&admin),
            json!({
                "name": "rust",
                "image": "https://img.example.com/r.png",
                "content": "Another category named the same."
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Category create failed");
}

#[tokio::test]
async fn should_read_update_and_delete_category() {
    let app = spawn_app().await;
    let admin = app.admin("admin@x.com").await;
    let category = app.category(&admin, "Rust").await;
    app.link(&admin, "https://a.example.com", &category).await;
    app.link(&admin, "https://b.example.com", &category).await;

    let (status, body) = app.get("/api/category/rust?limit=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"]["name"], "Rust");
    assert_eq!(body["links"].as_array().unwrap().len(), 1);

    let (status, body) = app
        .put(
            "/api/category/rust",
            Some(&admin),
            json!({ "name": "Rust Lang", "content": "Updated content for the Rust category." }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Rust Lang");
    assert_eq!(body["slug"], "rust");
    assert_eq!(body["image_url"], "https://img.example.com/cat.png");

    let (status, body) = app.delete("/api/category/rust", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category deleted successfully");

    let (status, body) = app.get("/api/category/rust", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Could not load category");
}

#[tokio::test]
async fn should_report_malformed_pagination_as_json_error() {
    let app = spawn_app().await;
    let admin = app.admin("admin@x.com").await;
    app.category(&admin, "Rust").await;

    let (status, body) = app.get("/api/category/rust?limit=abc", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!body["error"].as_str().unwrap().is_empty());
}
