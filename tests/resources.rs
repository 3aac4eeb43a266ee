mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::{TestApp, hs256_token};

fn id(body: &Value) -> &str {
    body["id"].as_str().expect("id")
}

#[tokio::test]
async fn pet_lifecycle() {
    let app = TestApp::new();
    let token = hs256_token("alice", None);

    let (status, created) = app
        .post(
            "/api/v1/me/pets",
            &token,
            json!({
                "name": "Luna",
                "sex": "female",
                "breed": "beagle",
                "age_months": 18,
                "weight_kg": 11.5,
                "birthday_day": 4,
                "birthday_month": 3,
                "birth_date": "2023-03-04",
                "photo_url": "https://cdn.example.com/luna.jpg",
                "photo_width": 800,
                "photo_height": 600
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["birth_date"], "2023-03-04");
    assert_eq!(created["photo_width"], 800);
    assert_ne!(id(&created), "1", "internal ids are never exposed");
    let uri = format!("/api/v1/me/pets/{}", id(&created));

    let (status, updated) = app.put(&uri, &token, json!({"weight_kg": 12.0})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["weight_kg"], 12.0);
    assert_eq!(updated["name"], "Luna");
    assert_eq!(updated["breed"], "beagle");

    let (status, body) = app.delete(&uri, &token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = app.get(&uri, &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pets_are_listed_newest_first() {
    let app = TestApp::new();
    let token = hs256_token("alice", None);
    app.create_pet(&token, "First").await;
    app.create_pet(&token, "Second").await;

    let (_, listed) = app.get("/api/v1/me/pets", &token).await;
    let names: Vec<_> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();

    assert_eq!(names, vec!["Second", "First"]);
}

#[tokio::test]
async fn invalid_pet_reports_issues_per_field() {
    let app = TestApp::new();
    let token = hs256_token("alice", None);

    let (status, body) = app
        .post(
            "/api/v1/me/pets",
            &token,
            json!({"name": "", "sex": "male", "birthday_month": 13}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad input");
    let paths: Vec<_> = body["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["name", "birthday_month"]);
}

#[tokio::test]
async fn undecodable_public_id_is_bad_input() {
    let app = TestApp::new();
    let token = hs256_token("alice", None);

    let (status, body) = app.get("/api/v1/me/pets/not-a-public-id", &token).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "Bad input", "issues": [{"path": "pet_id", "message": "invalid id"}]})
    );
}

#[tokio::test]
async fn notes_belong_to_a_pet_and_sort_newest_first() {
    let app = TestApp::new();
    let token = hs256_token("alice", None);
    let pet_id = app.create_pet(&token, "Luna").await;
    let notes_uri = format!("/api/v1/me/pets/{pet_id}/notes");

    for (content, at) in [
        ("older", "2024-05-01T08:00:00Z"),
        ("newest", "2024-05-03T08:00:00Z"),
        ("middle", "2024-05-02T08:00:00Z"),
    ] {
        let (status, note) = app
            .post(&notes_uri, &token, json!({"content": content, "noted_at": at}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(note["pet_id"], pet_id.as_str());
    }

    let (_, listed) = app.get(&notes_uri, &token).await;
    let contents: Vec<_> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["newest", "middle", "older"]);

    let (status, body) = app.post(&notes_uri, &token, json!({"title": "no body"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["issues"][0]["path"], "content");
}

#[tokio::test]
async fn note_update_and_delete() {
    let app = TestApp::new();
    let token = hs256_token("alice", None);
    let pet_id = app.create_pet(&token, "Luna").await;
    let (_, note) = app
        .post(
            &format!("/api/v1/me/pets/{pet_id}/notes"),
            &token,
            json!({"title": "walk", "content": "20 minutes"}),
        )
        .await;
    let uri = format!("/api/v1/me/notes/{}", id(&note));

    let (status, updated) = app.put(&uri, &token, json!({"content": "45 minutes"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "walk");
    assert_eq!(updated["content"], "45 minutes");

    assert_eq!(app.delete(&uri, &token).await.0, StatusCode::NO_CONTENT);
    assert_eq!(app.get(&uri, &token).await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn events_sort_soonest_first_and_can_detach_from_pet() {
    let app = TestApp::new();
    let token = hs256_token("alice", None);
    let pet_id = app.create_pet(&token, "Luna").await;

    let (_, later) = app
        .post(
            "/api/v1/me/events",
            &token,
            json!({"title": "grooming", "starts_at": "2030-02-01T10:00:00Z", "pet_id": pet_id}),
        )
        .await;
    app.post(
        "/api/v1/me/events",
        &token,
        json!({"title": "vaccine", "starts_at": "2030-01-01T10:00:00Z"}),
    )
    .await;
    assert_eq!(later["pet_id"], pet_id.as_str());

    let (_, listed) = app.get("/api/v1/me/events", &token).await;
    let titles: Vec<_> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["vaccine", "grooming"]);

    let uri = format!("/api/v1/me/events/{}", id(&later));
    let (status, updated) = app
        .put(&uri, &token, json!({"pet_id": null, "description": "bring leash"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["pet_id"], Value::Null);
    assert_eq!(updated["description"], "bring leash");
    assert_eq!(updated["title"], "grooming");
}

#[tokio::test]
async fn deleting_a_pet_removes_its_notes_and_detaches_events() {
    let app = TestApp::new();
    let token = hs256_token("alice", None);
    let pet_id = app.create_pet(&token, "Luna").await;
    let (_, note) = app
        .post(
            &format!("/api/v1/me/pets/{pet_id}/notes"),
            &token,
            json!({"content": "vet visit"}),
        )
        .await;
    let (_, event) = app
        .post(
            "/api/v1/me/events",
            &token,
            json!({"title": "checkup", "starts_at": "2030-01-01T10:00:00Z", "pet_id": pet_id}),
        )
        .await;

    let (status, _) = app.delete(&format!("/api/v1/me/pets/{pet_id}"), &token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let note_uri = format!("/api/v1/me/notes/{}", id(&note));
    assert_eq!(app.get(&note_uri, &token).await.0, StatusCode::NOT_FOUND);

    let (status, event) = app
        .get(&format!("/api/v1/me/events/{}", id(&event)), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event["pet_id"], Value::Null);
}

#[tokio::test]
async fn event_requires_title_and_start() {
    let app = TestApp::new();
    let token = hs256_token("alice", None);

    let (status, body) = app.post("/api/v1/me/events", &token, json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["issues"],
        json!([
            {"path": "title", "message": "title is required"},
            {"path": "starts_at", "message": "starts_at is required"}
        ])
    );
}
