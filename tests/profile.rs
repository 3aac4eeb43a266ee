mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{TestApp, hs256_token};

const ME: &str = "/api/v1/me";

#[tokio::test]
async fn repeated_requests_keep_one_profile_and_follow_email() {
    let app = TestApp::new();

    app.get(ME, &hs256_token("alice", Some("old@example.com"))).await;
    let (status, body) = app
        .get(ME, &hs256_token("alice", Some("new@example.com")))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "new@example.com");
    assert_eq!(app.store.user_count().await, 1);
}

#[tokio::test]
async fn token_without_email_gets_empty_email() {
    let app = TestApp::new();

    let (_, body) = app.get(ME, &hs256_token("alice", None)).await;

    assert_eq!(body["email"], "");
}

#[tokio::test]
async fn profile_update_sets_and_clears_fields() {
    let app = TestApp::new();
    let token = hs256_token("alice", Some("alice@example.com"));

    let (status, body) = app
        .put(ME, &token, json!({"name": "  Alice ", "phone": "+54 11 5555"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["phone"], "+54 11 5555");

    // absent name is kept, null phone clears
    let (status, body) = app.put(ME, &token, json!({"phone": null})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["phone"], json!(null));

    // email is not client-editable
    let (_, body) = app
        .put(ME, &token, json!({"email": "forged@example.com"}))
        .await;
    assert_eq!(body["email"], "alice@example.com");
}

#[tokio::test]
async fn blank_name_is_bad_input() {
    let app = TestApp::new();

    let (status, body) = app
        .put(ME, &hs256_token("alice", None), json!({"name": "   "}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad input");
    assert_eq!(body["issues"][0]["path"], "name");
}

#[tokio::test]
async fn malformed_json_is_bad_input() {
    let app = TestApp::new();
    let token = hs256_token("alice", None);

    let (status, body) = app.put(ME, &token, json!("just a string")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad input");
    assert_eq!(body["issues"][0]["path"], "body");
}
