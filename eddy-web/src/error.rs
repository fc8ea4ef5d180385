//! Request-level errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use eddy_core::{CatalogError, StorageError};
use tracing::{error, warn};

use crate::streaming::UploadError;

/// Failure of a single request. Never takes the server down.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Unknown video id, or a catalog record whose file is gone
    #[error("Not found")]
    NotFound,

    /// Metadata store lookup or insert failed
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Video file could not be created or opened
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Upload body could not be persisted
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),
}

impl WebError {
    /// Status code sent to the client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebError::NotFound => StatusCode::NOT_FOUND,
            WebError::Upload(UploadError::Body { .. }) => StatusCode::BAD_REQUEST,
            WebError::Catalog(_) | WebError::Storage(_) | WebError::Upload(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            WebError::NotFound => {}
            WebError::Upload(UploadError::Body { .. }) => warn!(error = %self, "Request failed"),
            _ => error!(error = %self, "Request failed"),
        }
        status.into_response()
    }
}
