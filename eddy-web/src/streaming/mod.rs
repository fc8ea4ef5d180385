//! Byte streaming between files and HTTP bodies
//!
//! Both directions are pull driven. Downloads read the next buffer only when
//! the client side polls the body for more data; uploads read the next body
//! frame only after the previous one has been written out. Neither direction
//! buffers more than one chunk per request.

mod ingest;
mod window;

pub use ingest::{UploadError, persist_body};
pub use window::stream_window;
