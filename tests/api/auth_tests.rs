//! Authentication API Tests
//!
//! Only paths that are rejected before touching the database.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

use crate::common::{json_body, TestApp};

#[test_case(json!({"name": "al", "email": "al@example.com", "password": "secret1"}) ; "short name")]
#[test_case(json!({"name": "alice", "email": "not-an-email", "password": "secret1"}) ; "bad email")]
#[test_case(json!({"name": "alice", "email": "alice@example.com", "password": "12345"}) ; "short password")]
#[tokio::test]
async fn test_register_rejects_invalid_body(body: serde_json::Value) {
    let app = TestApp::new().await;

    let response = app.post_json("/api/auth/register", &body.to_string()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["code"], 10007);
}

#[tokio::test]
async fn test_login_rejects_invalid_email() {
    let app = TestApp::new().await;
    let body = json!({"email": "nobody", "password": "secret1"});

    let response = app.post_json("/api/auth/login", &body.to_string()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_users_requires_token() {
    let app = TestApp::new().await;

    let response = app.get("/api/users").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = json_body(response).await;
    assert_eq!(json["message"], "Missing authorization header");
}

#[tokio::test]
async fn test_users_rejects_forged_token() {
    let app = TestApp::new().await;

    let response = app.get_auth("/api/users", "not.a.jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["message"], "Invalid token");
}
