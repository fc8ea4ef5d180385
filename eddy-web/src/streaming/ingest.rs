//! Persisting upload bodies to disk.

use axum::body::Body;
use futures::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::trace;

/// Errors while copying an upload body to its file.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The request body stream failed, usually a client disconnect
    #[error("Request body interrupted: {source}")]
    Body {
        /// The underlying body error
        #[from]
        source: axum::Error,
    },

    /// Writing the video file failed
    #[error("Writing upload failed: {source}")]
    Io {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },
}

/// Copies `body` into `file` verbatim and returns the number of bytes written.
///
/// The next body frame is only pulled once the previous one has been handed to
/// the writer. On error the file is closed and left as is; partial uploads are
/// not removed.
///
/// # Errors
///
/// - `UploadError::Body` - If the request body stream fails before completion
/// - `UploadError::Io` - If writing or flushing the file fails
pub async fn persist_body(body: Body, file: File) -> Result<u64, UploadError> {
    let mut frames = body.into_data_stream();
    let mut writer = BufWriter::new(file);
    let mut written = 0u64;

    while let Some(frame) = frames.next().await {
        let chunk = frame?;
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
        trace!(chunk = chunk.len(), written, "Persisted upload chunk");
    }

    writer.flush().await?;
    writer.into_inner().sync_all().await?;
    Ok(written)
}
