//! Chat History API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::{json_body, TestApp};

#[tokio::test]
async fn test_history_requires_token() {
    let app = TestApp::new().await;

    let response = app.get("/api/messages/2").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_history_rejects_non_numeric_id() {
    let app = TestApp::new().await;
    let token = app.token_for(1);

    let response = app.get_auth("/api/messages/abc", &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "Invalid user ID parameter");
}
