//! Video retrieval and upload handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Uri};
use axum::response::Response;
use eddy_core::{DEFAULT_CONTENT_TYPE, VideoId, VideoRecord, plan_chunk, resolve_range};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::range::{build_video_response, clamp_to_resource, extract_range_header, range_not_satisfiable};
use crate::error::WebError;
use crate::server::AppState;
use crate::streaming::{persist_body, stream_window};

/// Acknowledgment sent once an upload has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Retrieval URL of the new video
    pub url: String,
}

/// `GET /videos/{id}`: serve a video, honoring the first requested range.
///
/// # Errors
/// - `WebError::NotFound` - Unknown id, or the record's file is missing
/// - `WebError::Catalog` / `WebError::Storage` - Lookup or open failed
pub async fn stream_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    let id = VideoId::new(id);
    let record = state
        .catalog
        .find_by_id(&id)
        .await?
        .ok_or(WebError::NotFound)?;

    let Some(opened) = state.storage.open(&record.id).await? else {
        warn!(%id, "Catalog record has no video file");
        return Err(WebError::NotFound);
    };

    let range_header = extract_range_header(&headers);
    let range = resolve_range(range_header, opened.total_length);
    let plan = plan_chunk(range, opened.total_length, state.streaming.max_chunk_size);

    let plan = match clamp_to_resource(plan) {
        Ok(plan) => plan,
        Err(total_length) => {
            debug!(%id, range = ?range_header, total_length, "Unsatisfiable range");
            return Ok(range_not_satisfiable(total_length));
        }
    };

    debug!(
        %id,
        range = ?range_header,
        status = plan.status.as_u16(),
        start = plan.start,
        length = plan.content_length(),
        total = plan.total_length,
        "Serving video"
    );

    let body = Body::from_stream(stream_window(
        opened.file,
        plan.window(),
        state.streaming.read_buffer_size,
    ));
    Ok(build_video_response(&plan, &record.content_type, body))
}

/// `PUT /{name}`: store the body as a new video named after the path.
///
/// The catalog record is only written once the whole body is on disk. An
/// interrupted upload leaves an orphan file and no record.
///
/// # Errors
/// - `WebError::Upload` - Body interrupted or file write failed
/// - `WebError::Storage` - Video file could not be created
/// - `WebError::Catalog` - Record insert failed after the file was written
pub async fn upload_video(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<UploadResponse>, WebError> {
    let id = state.catalog.allocate_id();
    let name = display_name(&uri);
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();

    let file = state.storage.create(&id).await?;
    info!(%id, %name, %content_type, "Receiving upload");

    let written = persist_body(body, file).await.inspect_err(|e| {
        warn!(%id, error = %e, "Upload aborted, leaving orphan file");
    })?;

    let record = VideoRecord::new(id, name, content_type);
    let url = record.url();
    let id = record.id.clone();
    state.catalog.insert(record).await?;
    info!(%id, bytes = written, "Upload committed");

    Ok(Json(UploadResponse { url }))
}

/// Display name for an upload: the percent-decoded path without its leading slash.
fn display_name(uri: &Uri) -> String {
    let raw = uri.path().strip_prefix('/').unwrap_or(uri.path());
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let uri: Uri = "/holiday.mp4".parse().unwrap();
        assert_eq!(display_name(&uri), "holiday.mp4");

        let uri: Uri = "/my%20clip%3Cb%3E.webm?x=1".parse().unwrap();
        assert_eq!(display_name(&uri), "my clip<b>.webm");

        let uri: Uri = "/".parse().unwrap();
        assert_eq!(display_name(&uri), "");
    }

    #[test]
    fn test_invalid_utf8_name_falls_back_to_raw() {
        let uri: Uri = "/bad%FF".parse().unwrap();
        assert_eq!(display_name(&uri), "bad%FF");
    }

    #[test]
    fn test_upload_response_json() {
        let json = serde_json::to_string(&UploadResponse {
            url: "/videos/1".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"url":"/videos/1"}"#);
    }
}
