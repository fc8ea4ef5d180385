//! Fallback dispatch: uploads on any path, otherwise the static frontend bundle.

use std::path::{Component, Path, PathBuf};

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use eddy_core::storage::open_regular_file;
use tracing::debug;

use super::videos::upload_video;
use crate::error::WebError;
use crate::server::AppState;
use crate::streaming::stream_window;

/// Requests that matched no route.
///
/// `PUT` is an upload whatever the path. Anything under `/videos/` that did
/// not match a video route is a missing video. Everything else is looked up in
/// the static root.
pub async fn fallback(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Response {
    if method == Method::PUT {
        return upload_video(State(state), uri, headers, body)
            .await
            .into_response();
    }

    if uri.path().starts_with("/videos/") {
        return WebError::NotFound.into_response();
    }

    match serve_static(&state, uri.path()).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

/// Stream a file from the static root, or redirect to the parent directory.
///
/// # Errors
/// - `WebError::Storage` - The file exists but could not be opened
pub async fn serve_static(state: &AppState, url_path: &str) -> Result<Response, WebError> {
    let relative = if url_path == "/" { "/index.html" } else { url_path };
    let fs_path = resolve_static_path(&state.static_dir, relative);

    let Some(opened) = open_regular_file(&fs_path).await? else {
        debug!(path = %url_path, "No static asset, redirecting to parent");
        return Ok(redirect_to_parent());
    };

    let content_type = mime_guess::from_path(&fs_path)
        .first_raw()
        .unwrap_or("text/plain");

    let body = Body::from_stream(stream_window(
        opened.file,
        0..opened.total_length,
        state.streaming.read_buffer_size,
    ));

    let mut response = Response::new(body);
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(opened.total_length));
    Ok(response)
}

/// Map a URL path onto the static root.
///
/// The path is percent-decoded and normalized lexically, so `..` segments can
/// never climb above `root`.
pub fn resolve_static_path(root: &Path, url_path: &str) -> PathBuf {
    let decoded = urlencoding::decode(url_path)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| url_path.to_string());

    let mut segments: Vec<&str> = Vec::new();
    for component in Path::new(&decoded).components() {
        match component {
            Component::Normal(segment) => {
                if let Some(segment) = segment.to_str() {
                    segments.push(segment);
                }
            }
            Component::ParentDir => {
                segments.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }

    segments
        .into_iter()
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}

fn redirect_to_parent() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::FOUND;
    response
        .headers_mut()
        .insert(LOCATION, HeaderValue::from_static(".."));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_static_path() {
        let root = Path::new("/srv/dist");

        assert_eq!(
            resolve_static_path(root, "/index.html"),
            PathBuf::from("/srv/dist/index.html")
        );
        assert_eq!(
            resolve_static_path(root, "/assets/./app.js"),
            PathBuf::from("/srv/dist/assets/app.js")
        );
        assert_eq!(
            resolve_static_path(root, "/my%20file.css"),
            PathBuf::from("/srv/dist/my file.css")
        );
    }

    #[test]
    fn test_resolve_static_path_cannot_escape_root() {
        let root = Path::new("/srv/dist");

        assert_eq!(
            resolve_static_path(root, "/../../etc/passwd"),
            PathBuf::from("/srv/dist/etc/passwd")
        );
        assert_eq!(
            resolve_static_path(root, "/assets/%2e%2e/%2e%2e/secret"),
            PathBuf::from("/srv/dist/secret")
        );
        assert_eq!(resolve_static_path(root, "/.."), PathBuf::from("/srv/dist"));
    }

    #[test]
    fn test_redirect_to_parent() {
        let response = redirect_to_parent();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "..");
    }
}
