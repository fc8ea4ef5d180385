//! HTTP request handlers organized by functionality

pub mod assets;
pub mod pages;
pub mod range;
pub mod videos;

// Re-export handler functions
pub use assets::{fallback, serve_static};
pub use pages::{render_video_list, sanitize_label, videos_page};
pub use range::{build_video_response, clamp_to_resource, extract_range_header};
pub use videos::{UploadResponse, stream_video, upload_video};
