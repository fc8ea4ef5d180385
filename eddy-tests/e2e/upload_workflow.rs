//! Upload, scrub and list over a real socket.

use std::net::SocketAddr;

use eddy_core::config::EddyConfig;
use eddy_core::test_fixtures::create_temp_deployment;
use eddy_web::{AppState, serve};
use futures::future;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Starts a server for `config` on an ephemeral port.
async fn spawn_server(config: &EddyConfig) -> (SocketAddr, JoinHandle<std::io::Result<()>>) {
    let state = AppState::from_config(config).await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(serve(listener, state));
    (addr, handle)
}

async fn upload(client: &reqwest::Client, addr: SocketAddr, name: &str, data: Vec<u8>) -> String {
    let response = client
        .put(format!("http://{addr}/{name}"))
        .header("content-type", "video/mp4")
        .body(data)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let ack: serde_json::Value = response.json().await.unwrap();
    ack["url"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_concurrent_uploads_get_distinct_ids() {
    let (_temp_dir, config) = create_temp_deployment();
    let (addr, server) = spawn_server(&config).await;
    let client = reqwest::Client::new();

    let first_data = vec![1u8; 70_000];
    let second_data = vec![2u8; 90_000];
    let (first_url, second_url) = future::join(
        upload(&client, addr, "first.mp4", first_data.clone()),
        upload(&client, addr, "second.mp4", second_data.clone()),
    )
    .await;

    assert_ne!(first_url, second_url);

    for (url, data) in [(&first_url, &first_data), (&second_url, &second_data)] {
        let response = client
            .get(format!("http://{addr}{url}"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(response.content_length(), Some(data.len() as u64));
        assert_eq!(response.bytes().await.unwrap().as_ref(), data.as_slice());
    }

    assert_eq!(std::fs::read_dir(&config.storage.videos_dir).unwrap().count(), 2);
    server.abort();
}

#[tokio::test]
async fn test_player_scrubs_with_successive_ranges() {
    let (_temp_dir, config) = create_temp_deployment();
    let (addr, server) = spawn_server(&config).await;
    let client = reqwest::Client::new();

    let data: Vec<u8> = (0..600_000u32).map(|i| (i % 199) as u8).collect();
    let url = upload(&client, addr, "movie.mp4", data.clone()).await;

    let mut received = Vec::new();
    while received.len() < data.len() {
        let response = client
            .get(format!("http://{addr}{url}"))
            .header("range", format!("bytes={}-", received.len()))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::PARTIAL_CONTENT);

        let chunk = response.bytes().await.unwrap();
        assert!(!chunk.is_empty());
        assert!(chunk.len() <= 262_144);
        received.extend_from_slice(&chunk);
    }

    assert_eq!(received, data);
    server.abort();
}

#[tokio::test]
async fn test_catalog_survives_restart() {
    let (_temp_dir, config) = create_temp_deployment();
    let client = reqwest::Client::new();

    let (addr, server) = spawn_server(&config).await;
    let url = upload(&client, addr, "keep.mp4", b"persisted".to_vec()).await;
    server.abort();
    let _ = server.await;

    let (addr, server) = spawn_server(&config).await;
    let listing = client
        .get(format!("http://{addr}/videos.html"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(listing.contains(&format!(r#"<a href="{url}">keep.mp4</a>"#)));

    let body = client
        .get(format!("http://{addr}{url}"))
        .send()
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    assert_eq!(body.as_ref(), b"persisted");
    server.abort();
}
