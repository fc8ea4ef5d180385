//! Shared in-process application for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use eddy_core::config::EddyConfig;
use eddy_core::test_fixtures::create_temp_deployment;
use eddy_core::{Catalog, InMemoryStore, MetadataStore, SequentialIdGenerator, VideoStorage};
use eddy_web::build_router;
use eddy_web::server::{AppState, StreamingSettings};
use tempfile::TempDir;
use tower::ServiceExt;

/// Router over a temporary deployment. The directory lives as long as the app.
pub struct TestApp {
    _temp_dir: TempDir,
    pub config: EddyConfig,
    pub router: Router,
}

/// Buffered response parts.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// App with an empty in-memory catalog and ids `video-1`, `video-2`, ...
pub fn in_memory_app() -> TestApp {
    app_with_store(Arc::new(InMemoryStore::new()))
}

pub fn app_with_store(store: Arc<dyn MetadataStore>) -> TestApp {
    let (temp_dir, config) = create_temp_deployment();
    let catalog = Catalog::new(store, Arc::new(SequentialIdGenerator::new("video")));
    let state = AppState::new(
        catalog,
        VideoStorage::new(&config.storage.videos_dir),
        &config.storage.static_dir,
        StreamingSettings::from_config(&config),
    );

    TestApp {
        _temp_dir: temp_dir,
        config,
        router: build_router(state),
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_range(&self, uri: &str, range: &str) -> TestResponse {
        self.send(
            Request::get(uri)
                .header("range", range)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Uploads `data` under `path` and returns the retrieval URL from the ack.
    pub async fn upload(&self, path: &str, content_type: Option<&str>, data: Vec<u8>) -> String {
        let mut request = Request::put(path);
        if let Some(content_type) = content_type {
            request = request.header("content-type", content_type);
        }

        let response = self.send(request.body(Body::from(data)).unwrap()).await;
        assert_eq!(response.status, StatusCode::OK);

        let ack: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        ack["url"].as_str().unwrap().to_string()
    }
}

/// Deterministic, non-repeating-looking test payload.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
