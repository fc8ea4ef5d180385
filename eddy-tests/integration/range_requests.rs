//! Range framing on video retrieval.

use axum::http::StatusCode;

use crate::harness::{in_memory_app, payload};

const CHUNK: usize = 262_144;

#[tokio::test]
async fn test_leading_range_is_partial() {
    let app = in_memory_app();
    let data = payload(1000);
    let url = app.upload("/clip.mp4", Some("video/mp4"), data.clone()).await;

    let response = app.get_range(&url, "bytes=0-99").await;

    assert_eq!(response.status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.header("content-range"), Some("bytes 0-99/1000"));
    assert_eq!(response.header("content-length"), Some("100"));
    assert_eq!(response.header("accept-ranges"), Some("bytes"));
    assert_eq!(response.body.as_ref(), &data[..100]);
}

#[tokio::test]
async fn test_middle_range_returns_exact_bytes() {
    let app = in_memory_app();
    let data = payload(1000);
    let url = app.upload("/clip.mp4", None, data.clone()).await;

    let response = app.get_range(&url, "bytes=100-200").await;

    assert_eq!(response.status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.header("content-range"), Some("bytes 100-200/1000"));
    assert_eq!(response.body.as_ref(), &data[100..=200]);
}

#[tokio::test]
async fn test_open_range_is_capped_to_chunk_size() {
    let app = in_memory_app();
    let data = payload(300_000);
    let url = app.upload("/big.mp4", None, data.clone()).await;

    let response = app.get_range(&url, "bytes=0-").await;

    assert_eq!(response.status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.header("content-range"),
        Some("bytes 0-262143/300000")
    );
    assert_eq!(response.body.len(), CHUNK);
    assert_eq!(response.body.as_ref(), &data[..CHUNK]);
}

#[tokio::test]
async fn test_follow_up_range_reaches_end_of_file() {
    let app = in_memory_app();
    let data = payload(300_000);
    let url = app.upload("/big.mp4", None, data.clone()).await;

    let response = app.get_range(&url, "bytes=262144-").await;

    assert_eq!(response.status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.header("content-range"),
        Some("bytes 262144-299999/300000")
    );
    assert_eq!(response.body.as_ref(), &data[CHUNK..]);
}

#[tokio::test]
async fn test_end_past_file_is_clamped() {
    let app = in_memory_app();
    let data = payload(1000);
    let url = app.upload("/clip.mp4", None, data.clone()).await;

    let response = app.get_range(&url, "bytes=900-5000").await;

    assert_eq!(response.status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.header("content-range"), Some("bytes 900-999/1000"));
    assert_eq!(response.body.as_ref(), &data[900..]);
}

#[tokio::test]
async fn test_bare_dash_keeps_partial_framing() {
    let app = in_memory_app();
    let data = payload(1000);
    let url = app.upload("/clip.mp4", None, data.clone()).await;

    let response = app.get_range(&url, "bytes=-").await;

    assert_eq!(response.status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.header("content-range"), Some("bytes 0-999/1000"));
    assert_eq!(response.body.as_ref(), data.as_slice());
}

#[tokio::test]
async fn test_only_first_range_is_honored() {
    let app = in_memory_app();
    let data = payload(1000);
    let url = app.upload("/clip.mp4", None, data.clone()).await;

    let response = app.get_range(&url, "bytes=0-9, 20-29").await;

    assert_eq!(response.status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.header("content-range"), Some("bytes 0-9/1000"));
    assert_eq!(response.body.as_ref(), &data[..10]);
}

#[tokio::test]
async fn test_malformed_range_serves_full_body() {
    let app = in_memory_app();
    let data = payload(1000);
    let url = app.upload("/clip.mp4", None, data.clone()).await;

    let response = app.get_range(&url, "pages=first").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-length"), Some("1000"));
    assert_eq!(response.body.as_ref(), data.as_slice());
}

#[tokio::test]
async fn test_range_past_end_is_unsatisfiable() {
    let app = in_memory_app();
    let url = app.upload("/clip.mp4", None, payload(1000)).await;

    let response = app.get_range(&url, "bytes=5000-6000").await;

    assert_eq!(response.status, StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(response.header("content-range"), Some("bytes */1000"));
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_inverted_range_is_unsatisfiable() {
    let app = in_memory_app();
    let url = app.upload("/clip.mp4", None, payload(1000)).await;

    let response = app.get_range(&url, "bytes=500-100").await;

    assert_eq!(response.status, StatusCode::RANGE_NOT_SATISFIABLE);
}

#[tokio::test]
async fn test_open_range_on_empty_file_serves_empty_body() {
    let app = in_memory_app();
    let url = app.upload("/empty.mp4", None, Vec::new()).await;

    let response = app.get_range(&url, "bytes=0-").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_empty());
}
