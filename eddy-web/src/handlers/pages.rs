//! Server-rendered listing page.

use axum::extract::State;
use axum::response::Html;
use eddy_core::VideoRecord;

use crate::error::WebError;
use crate::server::AppState;

const LISTING_STYLE: &str = "<style> * {
\tcolor-scheme: light dark;
\tcolor: rgba(255, 255, 255, 0.87);
\tbackground-color: #242424;
} </style>
";

/// `GET /videos.html`: list every video as a link.
///
/// # Errors
/// - `WebError::Catalog` - The metadata store could not be read
pub async fn videos_page(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    let videos = state.catalog.list_all().await?;
    Ok(Html(render_video_list(&videos)))
}

/// Render the listing document for `videos`, in the given order.
pub fn render_video_list(videos: &[VideoRecord]) -> String {
    let items: String = videos
        .iter()
        .map(|video| {
            format!(
                r#"<li><a href="/videos/{}">{}</a></li>"#,
                urlencoding::encode(video.id.as_str()),
                sanitize_label(&video.name)
            )
        })
        .collect();

    format!("{LISTING_STYLE}<h1>List of Videos</h1><ul>{items}</ul>")
}

/// Strip everything outside `[A-Za-z0-9_.-]` from an untrusted name.
pub fn sanitize_label(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect()
}

#[cfg(test)]
mod tests {
    use eddy_core::VideoId;

    use super::*;

    #[test]
    fn test_sanitize_label() {
        assert_eq!(sanitize_label("holiday_2024.mp4"), "holiday_2024.mp4");
        assert_eq!(
            sanitize_label("<script>\"x\"</script>.mp4"),
            "scriptxscript.mp4"
        );
        assert_eq!(sanitize_label("my clip (final)"), "myclipfinal");
        assert_eq!(sanitize_label("déjà-vu"), "dj-vu");
    }

    #[test]
    fn test_empty_listing() {
        let html = render_video_list(&[]);
        assert!(html.starts_with("<style>"));
        assert!(html.ends_with("<h1>List of Videos</h1><ul></ul>"));
    }

    #[test]
    fn test_listing_links_each_video() {
        let videos = vec![
            VideoRecord::new(VideoId::new("1"), "a<b>.mp4", "video/mp4"),
            VideoRecord::new(VideoId::new("2"), "second", "video/mp4"),
        ];
        let html = render_video_list(&videos);

        assert!(html.contains(r#"<li><a href="/videos/1">ab.mp4</a></li><li><a href="/videos/2">second</a></li>"#));
        assert!(!html.contains("a<b>"));
    }

    #[test]
    fn test_listing_encodes_ids_in_links() {
        let videos = vec![VideoRecord::new(
            VideoId::new("x\"y"),
            "n",
            "video/mp4",
        )];
        let html = render_video_list(&videos);
        assert!(html.contains(r#"href="/videos/x%22y""#));
    }
}
