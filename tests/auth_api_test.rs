mod common;

use axum::http::StatusCode;
use common::{assert_json, TestApp};
use serde_json::json;

#[tokio::test]
async fn register_then_login_and_fetch_profile() {
    let app = TestApp::new().await;

    let registered = assert_json(
        app.post_json(
            "/api/auth/register",
            json!({ "email": "new@example.com", "password": "supersecret" }),
            None,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(registered["user"]["email"], "new@example.com");
    assert_eq!(registered["user"]["role"], "user");
    assert!(registered["token"].as_str().is_some());

    let logged_in = assert_json(
        app.post_json(
            "/api/auth/login",
            json!({ "email": "new@example.com", "password": "supersecret" }),
            None,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    let token = logged_in["token"].as_str().unwrap().to_string();
    // No linked employee, so the display name falls back to the email
    assert_eq!(logged_in["user"]["name"], "new@example.com");

    let profile = assert_json(
        app.get_authed("/api/auth/profile", &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(profile["email"], "new@example.com");
    assert_eq!(profile["role"], "user");
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = TestApp::new().await;
    app.post_json(
        "/api/auth/register",
        json!({ "email": "new@example.com", "password": "supersecret" }),
        None,
    )
    .await;

    let response = app
        .post_json(
            "/api/auth/register",
            json!({ "email": "new@example.com", "password": "supersecret" }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn short_password_fails_validation() {
    let app = TestApp::new().await;
    let response = app
        .post_json(
            "/api/auth/register",
            json!({ "email": "new@example.com", "password": "short" }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = TestApp::new().await;
    let role = app.seed_role("user").await;
    app.seed_user("known@example.com", "correct-password", role.id, None)
        .await;

    let response = app
        .post_json(
            "/api/auth/login",
            json!({ "email": "known@example.com", "password": "wrong-password" }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .post_json(
            "/api/auth/login",
            json!({ "email": "unknown@example.com", "password": "whatever" }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_uses_linked_employee_name() {
    let app = TestApp::new().await;
    let dept = app.seed_department("Engineering").await;
    let emp = app
        .seed_employee("Ada", "Lovelace", "ada@example.com", dept.id, None)
        .await;
    let role = app.seed_role("admin").await;
    app.seed_user("ada@example.com", "supersecret", role.id, Some(emp.id))
        .await;

    let body = assert_json(
        app.post_json(
            "/api/auth/login",
            json!({ "email": "ada@example.com", "password": "supersecret" }),
            None,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["user"]["name"], "Ada Lovelace");
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn profile_without_token_is_unauthorized() {
    let app = TestApp::new().await;
    let response = app.get("/api/auth/profile").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_acknowledges() {
    let app = TestApp::new().await;
    let body = assert_json(
        app.post_json("/api/auth/logout", json!({}), None).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["message"], "Logged out successfully");
}
