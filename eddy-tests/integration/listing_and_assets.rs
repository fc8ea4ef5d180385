//! Listing page and static fallback.

use axum::http::StatusCode;
use eddy_core::test_fixtures::write_static_asset;

use crate::harness::in_memory_app;

#[tokio::test]
async fn test_empty_listing() {
    let app = in_memory_app();

    let response = app.get("/videos.html").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .header("content-type")
            .is_some_and(|value| value.starts_with("text/html"))
    );
    let html = String::from_utf8(response.body.to_vec()).unwrap();
    assert!(html.contains("<h1>List of Videos</h1><ul></ul>"));
}

#[tokio::test]
async fn test_listing_sanitizes_names_in_insertion_order() {
    let app = in_memory_app();
    app.upload("/holiday_2024.mp4", None, b"a".to_vec()).await;
    app.upload("/%3Cscript%3Ealert(1)%3C%2Fscript%3E.mp4", None, b"b".to_vec())
        .await;

    let response = app.get("/videos.html").await;
    let html = String::from_utf8(response.body.to_vec()).unwrap();

    let first = html
        .find(r#"<li><a href="/videos/video-1">holiday_2024.mp4</a></li>"#)
        .unwrap();
    let second = html
        .find(r#"<li><a href="/videos/video-2">scriptalert1script.mp4</a></li>"#)
        .unwrap();
    assert!(first < second);
    assert!(!html.contains("<script>"));
}

#[tokio::test]
async fn test_root_serves_index() {
    let app = in_memory_app();
    write_static_asset(&app.config, "index.html", b"<html>player</html>");

    let response = app.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("text/html"));
    assert_eq!(response.header("content-length"), Some("19"));
    assert_eq!(response.body.as_ref(), b"<html>player</html>");
}

#[tokio::test]
async fn test_nested_asset_gets_guessed_type() {
    let app = in_memory_app();
    write_static_asset(&app.config, "assets/app.css", b"body{}");

    let response = app.get("/assets/app.css").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("text/css"));
    assert_eq!(response.body.as_ref(), b"body{}");
}

#[tokio::test]
async fn test_unknown_extension_is_text_plain() {
    let app = in_memory_app();
    write_static_asset(&app.config, "LICENSE", b"MIT");

    let response = app.get("/LICENSE").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("text/plain"));
}

#[tokio::test]
async fn test_missing_asset_redirects_to_parent() {
    let app = in_memory_app();

    let response = app.get("/missing/page.js").await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.header("location"), Some(".."));
}

#[tokio::test]
async fn test_directory_redirects_to_parent() {
    let app = in_memory_app();
    write_static_asset(&app.config, "assets/app.js", b"1");

    let response = app.get("/assets").await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.header("location"), Some(".."));
}

#[tokio::test]
async fn test_traversal_stays_inside_static_root() {
    let app = in_memory_app();
    let outside = app.config.storage.static_dir.parent().unwrap().join("secret.txt");
    std::fs::write(&outside, b"secret").unwrap();

    let response = app.get("/%2e%2e/secret.txt").await;

    assert_eq!(response.status, StatusCode::FOUND);
}

#[tokio::test]
async fn test_path_below_a_file_redirects_to_parent() {
    let app = in_memory_app();
    write_static_asset(&app.config, "index.html", b"<html></html>");

    let response = app.get("/index.html/extra").await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.header("location"), Some(".."));
}

#[tokio::test]
async fn test_nul_in_path_redirects_to_parent() {
    let app = in_memory_app();

    let response = app.get("/%00").await;

    assert_eq!(response.status, StatusCode::FOUND);
}
