//! End-to-end HTTP tests against in-memory adapters

use std::collections::HashMap;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use reelbox_api::{
    auth::{AuthError, IdentityProvider},
    create_router,
    metrics::Metrics,
    AppState,
};
use reelbox_domain::{
    memory::{InMemoryEventPublisher, InMemoryVideoRepository, InMemoryVideoStorage},
    OwnerId, VideoService,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

const BOUNDARY: &str = "reelbox-test-boundary";

/// Fixed token table standing in for the identity service
struct StaticIdentity {
    tokens: HashMap<String, OwnerId>,
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn resolve(&self, token: &str) -> Result<OwnerId, AuthError> {
        self.tokens.get(token).copied().ok_or(AuthError::InvalidToken)
    }
}

struct TestApp {
    router: Router,
    storage: InMemoryVideoStorage,
    publisher: InMemoryEventPublisher,
}

fn test_app() -> TestApp {
    let storage = InMemoryVideoStorage::new();
    let publisher = InMemoryEventPublisher::new();
    let service = VideoService::new(
        storage.clone(),
        InMemoryVideoRepository::new(),
        publisher.clone(),
    );

    let tokens = HashMap::from([
        ("alice-token".to_string(), OwnerId::from_uuid(Uuid::new_v4())),
        ("bob-token".to_string(), OwnerId::from_uuid(Uuid::new_v4())),
    ]);
    let state = AppState::new(
        service,
        StaticIdentity { tokens },
        Metrics::new().unwrap(),
        "video-service",
    );

    TestApp {
        router: create_router(state),
        storage,
        publisher,
    }
}

fn multipart_body(filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: video/mp4\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(token: Option<&str>, filename: &str, data: &[u8]) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/videos/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(multipart_body(filename, data)))
        .unwrap()
}

fn request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn upload(app: &TestApp, token: &str, filename: &str) -> Value {
    let (status, body) = send(&app.router, upload_request(Some(token), filename, &[7u8; 1024])).await;
    assert_eq!(status, StatusCode::CREATED, "upload failed: {}", body);
    body
}

#[tokio::test]
async fn test_upload_returns_created_video() {
    let app = test_app();

    let body = upload(&app, "alice-token", "Movie.MP4").await;

    assert_eq!(body["original_filename"], "Movie.MP4");
    assert_eq!(body["format"], "mp4");
    assert_eq!(body["size_bytes"], 1024);
    assert!(body.get("storage_path").is_none());
    assert_eq!(app.storage.object_count(), 1);
    assert_eq!(app.publisher.events().len(), 1);
}

#[tokio::test]
async fn test_upload_bytes_reach_storage_intact() {
    let app = test_app();
    let payload: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();

    let (status, body) = send(
        &app.router,
        upload_request(Some("alice-token"), "long.mov", &payload),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["size_bytes"], 200_000);

    let key = format!(
        "videos/{}/{}.mov",
        body["owner_id"].as_str().unwrap(),
        body["id"].as_str().unwrap()
    );
    let object = app.storage.object(&key).unwrap();
    assert_eq!(object.data.as_ref(), payload.as_slice());
    assert_eq!(object.content_type, "video/mp4");
}

#[tokio::test]
async fn test_upload_requires_token() {
    let app = test_app();

    let (status, body) = send(&app.router, upload_request(None, "movie.mp4", b"data")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Not authenticated");
    assert_eq!(app.storage.object_count(), 0);
}

#[tokio::test]
async fn test_unknown_token_is_rejected() {
    let app = test_app();

    let (status, _) = send(&app.router, request(Method::GET, "/videos", Some("stolen"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_rejects_unsupported_format() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        upload_request(Some("alice-token"), "notes.txt", b"hello"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("txt"));
    assert_eq!(app.storage.object_count(), 0);
    assert!(app.publisher.events().is_empty());
}

#[tokio::test]
async fn test_get_is_scoped_to_owner() {
    let app = test_app();
    let created = upload(&app, "alice-token", "movie.mp4").await;
    let uri = format!("/videos/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app.router, request(Method::GET, &uri, Some("alice-token"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], created["id"]);

    let (status, body) = send(&app.router, request(Method::GET, &uri, Some("bob-token"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Video not found");
}

#[tokio::test]
async fn test_list_paginates_callers_videos() {
    let app = test_app();
    for i in 0..3 {
        upload(&app, "alice-token", &format!("clip-{}.webm", i)).await;
    }
    upload(&app, "bob-token", "other.mov").await;

    let (status, body) = send(
        &app.router,
        request(Method::GET, "/videos?page=2&page_size=2", Some("alice-token")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 2);
    assert_eq!(body["page_size"], 2);
    assert_eq!(body["videos"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_defaults_to_first_page() {
    let app = test_app();
    upload(&app, "alice-token", "movie.avi").await;

    let (status, body) = send(&app.router, request(Method::GET, "/videos", Some("alice-token"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 10);
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_list_rejects_invalid_pagination() {
    let app = test_app();

    for uri in ["/videos?page=0", "/videos?page_size=0", "/videos?page_size=101"] {
        let (status, _) = send(&app.router, request(Method::GET, uri, Some("alice-token"))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
    }
}

#[tokio::test]
async fn test_malformed_query_gets_json_error() {
    let app = test_app();

    for uri in ["/videos?page=-1", "/videos?page_size=ten"] {
        let (status, body) = send(&app.router, request(Method::GET, uri, Some("alice-token"))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
        assert!(body["error"].is_string(), "{}", uri);
    }
}

#[tokio::test]
async fn test_malformed_video_id_gets_json_error() {
    let app = test_app();

    for (method, uri) in [
        (Method::GET, "/videos/not-a-uuid"),
        (Method::DELETE, "/videos/not-a-uuid"),
        (Method::GET, "/videos/not-a-uuid/download-url"),
    ] {
        let (status, body) = send(&app.router, request(method, uri, Some("alice-token"))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
        assert!(body["error"].is_string(), "{}", uri);
    }
}

#[tokio::test]
async fn test_download_url_and_delete() {
    let app = test_app();
    let created = upload(&app, "alice-token", "movie.mkv").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(
        &app.router,
        request(
            Method::GET,
            &format!("/videos/{}/download-url?expires_in=60", id),
            Some("alice-token"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expires_in"], 60);
    assert!(body["url"].as_str().unwrap().contains("expires_in=60"));

    let uri = format!("/videos/{}", id);
    let (status, _) = send(&app.router, request(Method::DELETE, &uri, Some("bob-token"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app.router, request(Method::DELETE, &uri, Some("alice-token"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.storage.object_count(), 0);

    let (status, _) = send(&app.router, request(Method::GET, &uri, Some("alice-token"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_metrics() {
    let app = test_app();

    let (status, body) = send(&app.router, request(Method::GET, "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "video-service");

    upload(&app, "alice-token", "movie.mp4").await;
    let response = app
        .router
        .clone()
        .oneshot(request(Method::GET, "/metrics", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&text).contains("videos_uploaded_total 1"));
}
