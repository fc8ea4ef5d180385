//! Eddy Core - catalog, range resolution and storage for the Eddy media server
//!
//! This crate provides the building blocks that do not depend on HTTP:
//! identifier generation, `Range` header resolution, chunk planning, the
//! video catalog with its metadata stores, and the on-disk video layout.

pub mod catalog;
pub mod chunk;
pub mod config;
pub mod identifier;
pub mod range;
pub mod storage;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use catalog::{
    Catalog, CatalogError, DEFAULT_CONTENT_TYPE, InMemoryStore, JsonLinesStore, MetadataStore,
    RecordFilter, VideoRecord,
};
pub use chunk::{ChunkPlan, ChunkStatus, plan_chunk};
pub use config::EddyConfig;
pub use identifier::{FlakeIdGenerator, IdGenerator, SequentialIdGenerator, VideoId};
pub use range::{ByteRange, resolve_range};
pub use storage::{OpenedVideo, StorageError, VideoStorage};

/// Core errors that can bubble up from any Eddy subsystem.
#[derive(Debug, thiserror::Error)]
pub enum EddyError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EddyError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            EddyError::Catalog(_) => "Video catalog is unavailable".to_string(),
            EddyError::Storage(StorageError::InvalidId { id }) => {
                format!("Invalid video id: {id}")
            }
            EddyError::Storage(_) => "Video storage error occurred".to_string(),
            EddyError::Configuration { reason } => format!("Configuration error: {reason}"),
            EddyError::Io(_) => "File system error occurred".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EddyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let err = EddyError::from(StorageError::InvalidId {
            id: "..".to_string(),
        });
        assert_eq!(err.user_message(), "Invalid video id: ..");

        let err = EddyError::Configuration {
            reason: "port out of range".to_string(),
        };
        assert_eq!(err.user_message(), "Configuration error: port out of range");
    }
}
