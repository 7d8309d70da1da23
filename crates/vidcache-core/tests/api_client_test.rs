// Integration tests for `ApiClient` using wiremock.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vidcache_core::{ApiClient, ApiError, MemoryStore, NewVideo, Operation, VideoCollection, ViewState};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = format!("{}/collections", server.uri());
    let client = ApiClient::with_client(reqwest::Client::new(), &base_url)
        .expect("base url is set");
    (server, client)
}

fn new_video() -> NewVideo {
    NewVideo {
        title: "Big 4 Auditor Financial Analyst".to_string(),
        price: "Rp 300K".to_string(),
        instructor_name: "Jenna Ortega".to_string(),
        instructor_position: "Senior Accountant di Gojek".to_string(),
        review_count: 86,
        rating: 0.0,
        image_ref: None,
    }
}

// ── Fetch ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_videos() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/collections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "1", "title": "A", "price": "Rp 300K", "name": "Jenna",
              "position": "Accountant", "reviews": 86, "rating": 35 },
            { "id": 2, "title": "B" }
        ])))
        .mount(&server)
        .await;

    let videos = client.fetch_videos().await.unwrap();

    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0].id, "1");
    assert_eq!(videos[0].instructor_name, "Jenna");
    assert_eq!(videos[0].stars(), 4);
    assert_eq!(videos[1].id, "2");
    assert_eq!(videos[1].review_count, 0);
}

#[tokio::test]
async fn test_fetch_server_error_uses_default_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/collections"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = client.fetch_videos().await.unwrap_err();

    assert!(
        matches!(err, ApiError::ServerError { status: 503, .. }),
        "expected ServerError, got: {err:?}"
    );
    assert_eq!(err.user_message(Operation::Fetch), "Failed to fetch videos");
}

#[tokio::test]
async fn test_fetch_malformed_body_is_invalid_response() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/collections"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.fetch_videos().await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)), "got: {err:?}");
}

// ── Create ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_posts_video_without_id() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/collections"))
        .and(body_json(json!({
            "title": "Big 4 Auditor Financial Analyst",
            "price": "Rp 300K",
            "name": "Jenna Ortega",
            "position": "Senior Accountant di Gojek",
            "reviews": 86,
            "rating": 0.0
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "17",
            "title": "Big 4 Auditor Financial Analyst",
            "price": "Rp 300K",
            "name": "Jenna Ortega",
            "position": "Senior Accountant di Gojek",
            "reviews": 86,
            "rating": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client.create_video(&new_video()).await.unwrap();
    assert_eq!(created.id, "17");
    assert_eq!(created.title, "Big 4 Auditor Financial Analyst");
}

#[tokio::test]
async fn test_create_rejected_uses_server_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/collections"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "Price is required" })),
        )
        .mount(&server)
        .await;

    let err = client.create_video(&new_video()).await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected { status: 422, .. }), "got: {err:?}");
    assert_eq!(err.user_message(Operation::Create), "Price is required");
}

// ── Update / Delete ─────────────────────────────────────────────────

#[tokio::test]
async fn test_update_puts_full_video_to_item_path() {
    let (server, client) = setup().await;
    let video = new_video().with_id("5".to_string());

    Mock::given(method("PUT"))
        .and(path("/collections/5"))
        .and(body_json(serde_json::to_value(&video).unwrap()))
        .respond_with(ResponseTemplate::new(200).set_body_json(&video))
        .expect(1)
        .mount(&server)
        .await;

    let updated = client.update_video("5", &video).await.unwrap();
    assert_eq!(updated, video);
}

#[tokio::test]
async fn test_delete_ignores_confirmation_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/collections/2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("deleted"))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_video("2").await.unwrap();
}

#[tokio::test]
async fn test_delete_missing_video_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/collections/99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.delete_video("99").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }), "got: {err:?}");
    assert_eq!(err.user_message(Operation::Delete), "Failed to delete video");
}

// ── Collection over HTTP ────────────────────────────────────────────

#[tokio::test]
async fn test_collection_load_over_http() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/collections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "1", "title": "A" }])))
        .mount(&server)
        .await;

    let mut collection = VideoCollection::new(MemoryStore::new());
    collection.load(&client).await;

    assert_eq!(collection.state(), ViewState::Ready);
    assert_eq!(collection.videos().len(), 1);
}

#[tokio::test]
async fn test_collection_load_unreachable_server() {
    let client = ApiClient::new("http://127.0.0.1:1/collections", Duration::from_secs(2))
        .expect("base url is set");

    let mut collection = VideoCollection::new(MemoryStore::new());
    collection.load(&client).await;

    assert_eq!(collection.state(), ViewState::ErrorEmpty);
    assert_eq!(collection.error(), Some("Failed to fetch videos"));
}
