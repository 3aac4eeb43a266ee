mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{TestApp, hs256_token};

#[tokio::test]
async fn another_user_cannot_touch_my_pet() {
    let app = TestApp::new();
    let alice = hs256_token("alice", None);
    let bob = hs256_token("bob", None);
    let pet_id = app.create_pet(&alice, "Luna").await;
    let uri = format!("/api/v1/me/pets/{pet_id}");
    let not_found = json!({"error": "Pet not found"});

    assert_eq!(app.get(&uri, &bob).await, (StatusCode::NOT_FOUND, not_found.clone()));
    assert_eq!(
        app.put(&uri, &bob, json!({"name": "Stolen"})).await,
        (StatusCode::NOT_FOUND, not_found.clone())
    );
    assert_eq!(app.delete(&uri, &bob).await, (StatusCode::NOT_FOUND, not_found));

    let (status, body) = app.get(&uri, &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Luna");

    let (_, listed) = app.get("/api/v1/me/pets", &bob).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn foreign_and_missing_pets_look_identical() {
    let app = TestApp::new();
    let alice = hs256_token("alice", None);
    let bob = hs256_token("bob", None);
    let pet_id = app.create_pet(&alice, "Luna").await;
    let missing = app.codec.encode(999_999).unwrap();

    let foreign = app.get(&format!("/api/v1/me/pets/{pet_id}"), &bob).await;
    let absent = app.get(&format!("/api/v1/me/pets/{missing}"), &bob).await;

    assert_eq!(foreign, absent);
}

#[tokio::test]
async fn notes_and_events_cannot_hang_off_a_foreign_pet() {
    let app = TestApp::new();
    let alice = hs256_token("alice", None);
    let bob = hs256_token("bob", None);
    let pet_id = app.create_pet(&alice, "Luna").await;
    let notes_uri = format!("/api/v1/me/pets/{pet_id}/notes");

    let (status, _) = app.post(&notes_uri, &bob, json!({"content": "hi"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(&notes_uri, &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post(
            "/api/v1/me/events",
            &bob,
            json!({"pet_id": pet_id, "title": "vet", "starts_at": "2030-01-01T10:00:00Z"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Pet not found"}));
}

#[tokio::test]
async fn another_user_cannot_touch_my_notes_or_events() {
    let app = TestApp::new();
    let alice = hs256_token("alice", None);
    let bob = hs256_token("bob", None);
    let pet_id = app.create_pet(&alice, "Luna").await;

    let (_, note) = app
        .post(
            &format!("/api/v1/me/pets/{pet_id}/notes"),
            &alice,
            json!({"content": "first walk"}),
        )
        .await;
    let (_, event) = app
        .post(
            "/api/v1/me/events",
            &alice,
            json!({"title": "vaccine", "starts_at": "2030-01-01T10:00:00Z"}),
        )
        .await;
    let note_uri = format!("/api/v1/me/notes/{}", note["id"].as_str().unwrap());
    let event_uri = format!("/api/v1/me/events/{}", event["id"].as_str().unwrap());

    for uri in [&note_uri, &event_uri] {
        assert_eq!(app.get(uri, &bob).await.0, StatusCode::NOT_FOUND);
        assert_eq!(
            app.put(uri, &bob, json!({"title": "mine"})).await.0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(app.delete(uri, &bob).await.0, StatusCode::NOT_FOUND);
        assert_eq!(app.get(uri, &alice).await.0, StatusCode::OK);
    }

    let (_, bobs_events) = app.get("/api/v1/me/events", &bob).await;
    assert_eq!(bobs_events, json!([]));
}

#[tokio::test]
async fn owner_is_stamped_from_the_token_not_the_body() {
    let app = TestApp::new();
    let alice = hs256_token("alice", None);

    let (status, pet) = app
        .post(
            "/api/v1/me/pets",
            &alice,
            json!({"name": "Luna", "sex": "female", "owner_id": "bob"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(pet["owner_id"], "alice");

    let (_, event) = app
        .post(
            "/api/v1/me/events",
            &alice,
            json!({"title": "vet", "starts_at": "2030-01-01T10:00:00Z", "owner_id": "bob"}),
        )
        .await;
    assert_eq!(event["owner_id"], "alice");
}

#[tokio::test]
async fn created_pet_is_listed_exactly_once_for_its_owner() {
    let app = TestApp::new();
    let alice = hs256_token("alice", None);
    let pet_id = app.create_pet(&alice, "Luna").await;

    let (status, listed) = app.get("/api/v1/me/pets", &alice).await;

    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    let matches: Vec<_> = listed.iter().filter(|p| p["id"] == pet_id.as_str()).collect();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["owner_id"], "alice");
}
