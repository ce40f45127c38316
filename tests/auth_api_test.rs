//! 認証 API の統合テスト（インメモリリポジトリ使用）

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use barangay_records_server::adapter::handler;
use barangay_records_server::adapter::repository::{
    InMemoryResidentRepository, InMemoryUserRepository,
};
use barangay_records_server::test_support::{make_test_app_state, TEST_ADMIN_CODE};

struct TestApp {
    router: axum::Router,
    _upload_dir: tempfile::TempDir,
}

fn make_app() -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let state = make_test_app_state(
        Arc::new(InMemoryResidentRepository::new()),
        Arc::new(InMemoryUserRepository::new()),
        upload_dir.path(),
    );
    TestApp {
        router: handler::router(state),
        _upload_dir: upload_dir,
    }
}

impl TestApp {
    async fn send(&self, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(req).await
    }

    async fn get_with_token(&self, uri: &str, token: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        self.send(req).await
    }
}

#[tokio::test]
async fn test_register_user_then_login() {
    let app = make_app();

    let (status, body) = app
        .post(
            "/api/auth/register-user",
            json!({ "username": "secretary", "password": "s3cret!" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("passwordHash").is_none());

    let (status, body) = app
        .post(
            "/api/auth/login",
            json!({ "username": "secretary", "password": "s3cret!" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = app.get_with_token("/api/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "secretary");

    let (status, body) = app.get_with_token("/api/auth/verify", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"], "secretary");
}

#[tokio::test]
async fn test_register_user_ignores_admin_code() {
    let app = make_app();
    let (status, body) = app
        .post(
            "/api/auth/register-user",
            json!({ "username": "clerk", "password": "s3cret!", "adminCode": TEST_ADMIN_CODE }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "user");
}

#[tokio::test]
async fn test_register_admin() {
    let app = make_app();

    let (status, body) = app
        .post(
            "/api/auth/register-admin",
            json!({ "username": "kapitan", "password": "s3cret!", "adminCode": "guess" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Invalid admin registration code");

    let (status, body) = app
        .post(
            "/api/auth/register-admin",
            json!({ "username": "kapitan", "password": "s3cret!", "adminCode": TEST_ADMIN_CODE }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Admin user created successfully");
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = make_app();
    let creds = json!({ "username": "secretary", "password": "s3cret!" });
    app.post("/api/auth/register-user", creds.clone()).await;

    let (status, body) = app.post("/api/auth/register-user", creds).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username already exists");
}

#[tokio::test]
async fn test_register_validation_messages() {
    let app = make_app();

    let (status, body) = app
        .post(
            "/api/auth/register-user",
            json!({ "username": "ab", "password": "" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["errors"][0]["field"], "password");
    assert_eq!(body["errors"][0]["message"], "Password is required");
    assert_eq!(body["errors"][1]["field"], "username");
    assert_eq!(
        body["errors"][1]["message"],
        "Username must be at least 3 characters long"
    );
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = make_app();
    app.post(
        "/api/auth/register-user",
        json!({ "username": "secretary", "password": "s3cret!" }),
    )
    .await;

    let (status, body) = app
        .post(
            "/api/auth/login",
            json!({ "username": "secretary", "password": "wrong-pass" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid username or password");
}

#[tokio::test]
async fn test_verify_without_token() {
    let app = make_app();
    let req = Request::builder()
        .uri("/api/auth/verify")
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send(req).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "No token provided");
}

#[tokio::test]
async fn test_me_with_invalid_token() {
    let app = make_app();
    let (status, body) = app.get_with_token("/api/auth/me", "garbage").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn test_logout() {
    let app = make_app();
    let (status, body) = app.post("/api/auth/logout", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");
}
