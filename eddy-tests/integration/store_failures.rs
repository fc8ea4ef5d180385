//! Router behavior when the metadata store fails.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use eddy_core::{CatalogError, MetadataStore, RecordFilter, VideoRecord};

use crate::harness::app_with_store;

/// Store whose backing storage is gone.
struct UnavailableStore;

#[async_trait]
impl MetadataStore for UnavailableStore {
    async fn find(&self, _filter: &RecordFilter) -> Result<Vec<VideoRecord>, CatalogError> {
        Err(std::io::Error::other("store unavailable").into())
    }

    async fn insert(&self, _record: VideoRecord) -> Result<(), CatalogError> {
        Err(std::io::Error::other("store unavailable").into())
    }
}

#[tokio::test]
async fn test_lookup_failure_is_server_error() {
    let app = app_with_store(Arc::new(UnavailableStore));

    let response = app.get("/videos/anything").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_listing_failure_is_server_error() {
    let app = app_with_store(Arc::new(UnavailableStore));

    let response = app.get("/videos.html").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_insert_failure_keeps_file_without_record() {
    let app = app_with_store(Arc::new(UnavailableStore));

    let response = app
        .send(
            axum::http::Request::put("/clip.mp4")
                .body(axum::body::Body::from("payload"))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let orphan = app.config.storage.videos_dir.join("video-1");
    assert_eq!(std::fs::read(orphan).unwrap(), b"payload");
}
