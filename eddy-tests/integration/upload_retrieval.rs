//! Upload then retrieve through the router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use eddy_core::{InMemoryStore, VideoId, VideoRecord};

use crate::harness::{app_with_store, in_memory_app, payload};

#[tokio::test]
async fn test_upload_then_full_retrieval_round_trip() {
    let app = in_memory_app();
    let data = payload(1000);

    let url = app.upload("/clip.mp4", Some("video/mp4"), data.clone()).await;
    assert_eq!(url, "/videos/video-1");

    let response = app.get(&url).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-length"), Some("1000"));
    assert_eq!(response.header("content-type"), Some("video/mp4"));
    assert_eq!(response.header("accept-ranges"), Some("bytes"));
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));
    assert_eq!(response.header("access-control-allow-methods"), Some("GET"));
    assert_eq!(response.header("access-control-allow-headers"), Some("*"));
    assert!(response.header("content-range").is_none());
    assert_eq!(response.body.as_ref(), data.as_slice());
}

#[tokio::test]
async fn test_upload_ack_is_json() {
    let app = in_memory_app();

    let response = app
        .send(
            Request::put("/movie.webm")
                .body(Body::from("bytes"))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(response.body.as_ref(), br#"{"url":"/videos/video-1"}"#);
}

#[tokio::test]
async fn test_upload_writes_file_named_by_id() {
    let app = in_memory_app();

    app.upload("/a.mp4", None, b"first".to_vec()).await;
    app.upload("/b.mp4", None, b"second".to_vec()).await;

    let videos_dir = &app.config.storage.videos_dir;
    assert_eq!(std::fs::read(videos_dir.join("video-1")).unwrap(), b"first");
    assert_eq!(std::fs::read(videos_dir.join("video-2")).unwrap(), b"second");
}

#[tokio::test]
async fn test_upload_without_content_type_serves_text_plain() {
    let app = in_memory_app();
    let url = app.upload("/notes", None, b"hello".to_vec()).await;

    let response = app.get(&url).await;
    assert_eq!(response.header("content-type"), Some("text/plain"));
    assert_eq!(response.body.as_ref(), b"hello");
}

#[tokio::test]
async fn test_empty_upload_is_retrievable() {
    let app = in_memory_app();
    let url = app.upload("/empty.mp4", Some("video/mp4"), Vec::new()).await;

    let response = app.get(&url).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-length"), Some("0"));
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_put_on_video_route_uploads() {
    let app = in_memory_app();

    let url = app.upload("/videos/whatever", None, b"x".to_vec()).await;
    assert_eq!(url, "/videos/video-1");

    let listing = app.get("/videos.html").await;
    let html = String::from_utf8(listing.body.to_vec()).unwrap();
    assert!(html.contains(">videoswhatever</a>"));
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let app = in_memory_app();

    let response = app.get("/videos/does-not-exist").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_record_without_file_is_not_found() {
    let store = InMemoryStore::with_records(vec![VideoRecord::new(
        VideoId::new("ghost"),
        "ghost.mp4",
        "video/mp4",
    )]);
    let app = app_with_store(Arc::new(store));

    let response = app.get("/videos/ghost").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_nested_video_path_is_not_found() {
    let app = in_memory_app();

    let response = app.get("/videos/a/b").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
