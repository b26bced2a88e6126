//! Idea endpoints driven through the router.

use axum::http::{Method, StatusCode};
use integration_tests::{call, Harness, ADMIN, VISITOR};
use serde_json::json;

#[tokio::test]
async fn create_read_update_delete() {
    let h = Harness::new();
    let app = h.router();

    let (status, created) = call(
        &app,
        Method::POST,
        "/idea",
        Some(json!({
            "author_email": ADMIN,
            "summary": "Car-free Sundays",
            "content": "Close the waterfront to cars on Sundays",
            "tags": ["transport"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["enabled"], false);
    assert_eq!(created["votes"], 0);

    let (status, fetched) = call(&app, Method::GET, &format!("/idea/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["summary"], "Car-free Sundays");

    let (status, updated) = call(
        &app,
        Method::PUT,
        &format!("/idea/{id}"),
        Some(json!({
            "requester_user_email": ADMIN,
            "ip": "10.1.1.1",
            "summary": "Car-free weekends",
            "enabled": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["summary"], "Car-free weekends");
    assert_eq!(updated["enabled"], true);
    assert_eq!(updated["issues_ips"], json!(["10.1.1.1"]));

    let (status, count) = call(&app, Method::GET, "/ideaCount", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count, json!({ "count": 1 }));

    let (status, deleted) = call(&app, Method::DELETE, &format!("/idea/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["summary"], "Car-free weekends");

    let (status, body) = call(&app, Method::GET, &format!("/idea/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn visitor_create_is_forbidden() {
    let h = Harness::new();
    let (status, body) = call(
        &h.router(),
        Method::POST,
        "/idea",
        Some(json!({ "author_email": VISITOR, "summary": "Mine" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "permission_denied");
}

#[tokio::test]
async fn vote_then_duplicate_is_conflict() {
    let h = Harness::new();
    let app = h.router();
    let idea = h.idea_by(ADMIN, "Rain gardens").await;
    let payload = json!({ "idea_id": idea.id, "requester_user_email": VISITOR });

    let (status, voted) = call(&app, Method::POST, "/voteAnIdea", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(voted["votes"], 1);

    let (status, body) = call(&app, Method::POST, "/voteAnIdea", Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_vote");

    let (status, body) = call(
        &app,
        Method::POST,
        "/voteAnIdea",
        Some(json!({ "idea_id": idea.id, "requester_user_email": ADMIN })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "self_vote");
}

#[tokio::test]
async fn get_ideas_pages_and_projects() {
    let h = Harness::new();
    let app = h.router();
    for i in 0..12 {
        h.idea_by(ADMIN, &format!("Idea {i}")).await;
    }

    let (status, page) = call(
        &app,
        Method::POST,
        "/getIdeas",
        Some(json!({ "page_size": 5, "page_number": 2, "include_summary": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let summaries: Vec<_> = page
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["summary"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(summaries, vec!["Idea 10", "Idea 11"]);
    assert_eq!(page[0]["content"], "");

    let (status, body) = call(&app, Method::POST, "/getIdeas", Some(json!({ "page_size": 1000 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn wrong_field_type_is_bad_request() {
    let h = Harness::new();
    let (status, body) = call(
        &h.router(),
        Method::POST,
        "/getIdeas",
        Some(json!({ "page_size": "five" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}
