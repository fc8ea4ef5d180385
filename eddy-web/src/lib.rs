//! Eddy Web - HTTP server

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Serves uploaded videos with byte-range support, accepts uploads over `PUT`,
//! renders the video listing page and falls back to a static frontend bundle.

pub mod error;
pub mod handlers;
pub mod server;
pub mod streaming;

// Re-export main types
pub use error::WebError;
pub use server::{AppState, build_router, run_server, serve};
