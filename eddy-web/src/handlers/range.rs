//! HTTP Range framing for video responses
//!
//! Header extraction, clamping of planned windows to the actual file, and the
//! header set every video response carries.

use axum::body::Body;
use axum::http::header::{
    ACCEPT_RANGES, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, RANGE,
};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use eddy_core::{ChunkPlan, ChunkStatus};

/// Content type used when a stored record carries an unusable one.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Extract the raw `Range` header value.
///
/// Returns None if no range header is present or the value is not visible ASCII.
pub fn extract_range_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(RANGE).and_then(|range| range.to_str().ok())
}

/// Clamp a planned window to a file of `plan.total_length` bytes.
///
/// Full plans pass through. A partial window whose end runs past the file is
/// shortened to the last byte.
///
/// # Errors
/// Returns the total length when the window starts at or beyond the end of
/// the file or is inverted, which the caller answers with 416.
pub fn clamp_to_resource(plan: ChunkPlan) -> Result<ChunkPlan, u64> {
    if plan.status == ChunkStatus::Full {
        return Ok(plan);
    }

    let total = plan.total_length;
    if plan.start >= total || plan.start > plan.end {
        return Err(total);
    }

    Ok(ChunkPlan {
        end: plan.end.min(total - 1),
        ..plan
    })
}

/// Build a video response for a planned window.
///
/// Always sends `Accept-Ranges`, permissive CORS headers for cross-origin
/// players and `Content-Length`; partial plans add `Content-Range`.
pub fn build_video_response(plan: &ChunkPlan, content_type: &str, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = match plan.status {
        ChunkStatus::Full => StatusCode::OK,
        ChunkStatus::Partial => StatusCode::PARTIAL_CONTENT,
    };

    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_CONTENT_TYPE)),
    );
    headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(plan.content_length()));

    if let Some(content_range) = plan.content_range()
        && let Ok(value) = HeaderValue::from_str(&content_range)
    {
        headers.insert(CONTENT_RANGE, value);
    }

    response
}

/// 416 response for a window that misses the file entirely.
pub fn range_not_satisfiable(total_length: u64) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::RANGE_NOT_SATISFIABLE;

    let headers = response.headers_mut();
    headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    if let Ok(value) = HeaderValue::from_str(&format!("bytes */{total_length}")) {
        headers.insert(CONTENT_RANGE, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use eddy_core::{ByteRange, plan_chunk};

    use super::*;

    fn partial(start: u64, end: u64, total: u64) -> ChunkPlan {
        plan_chunk(Some(ByteRange::new(start, end)), total, 262_144)
    }

    #[test]
    fn test_extract_range_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_range_header(&headers), None);

        headers.insert(RANGE, HeaderValue::from_static("bytes=0-99"));
        assert_eq!(extract_range_header(&headers), Some("bytes=0-99"));
    }

    #[test]
    fn test_clamp_passes_full_plans() {
        let plan = plan_chunk(None, 0, 262_144);
        assert_eq!(clamp_to_resource(plan.clone()), Ok(plan));
    }

    #[test]
    fn test_clamp_shortens_end() {
        let clamped = clamp_to_resource(partial(100, 5000, 1000)).unwrap();
        assert_eq!((clamped.start, clamped.end), (100, 999));
    }

    #[test]
    fn test_clamp_rejects_start_past_end_of_file() {
        assert_eq!(clamp_to_resource(partial(1000, 1100, 1000)), Err(1000));
        assert_eq!(clamp_to_resource(partial(0, 10, 0)), Err(0));
    }

    #[test]
    fn test_clamp_rejects_inverted_window() {
        assert_eq!(clamp_to_resource(partial(500, 100, 1000)), Err(1000));
    }

    #[test]
    fn test_partial_response_headers() {
        let plan = partial(0, 99, 1000);
        let response = build_video_response(&plan, "video/mp4", Body::empty());

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        let headers = response.headers();
        assert_eq!(headers[CONTENT_TYPE], "video/mp4");
        assert_eq!(headers[ACCEPT_RANGES], "bytes");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "*");
        assert_eq!(headers[CONTENT_LENGTH], "100");
        assert_eq!(headers[CONTENT_RANGE], "bytes 0-99/1000");
    }

    #[test]
    fn test_full_response_headers() {
        let plan = plan_chunk(None, 1000, 262_144);
        let response = build_video_response(&plan, "bad\nvalue", Body::empty());

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[CONTENT_TYPE], FALLBACK_CONTENT_TYPE);
        assert_eq!(headers[CONTENT_LENGTH], "1000");
        assert!(headers.get(CONTENT_RANGE).is_none());
    }

    #[test]
    fn test_range_not_satisfiable() {
        let response = range_not_satisfiable(1000);
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[CONTENT_RANGE], "bytes */1000");
    }
}
