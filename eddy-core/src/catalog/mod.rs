//! Video catalog.
//!
//! The catalog is the logical collection of upload metadata. Records live in a
//! [`MetadataStore`]; the [`Catalog`] service composes a store with an
//! [`IdGenerator`] so the web layer never touches either directly.

pub mod json_lines;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
pub use json_lines::JsonLinesStore;
pub use memory::InMemoryStore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::identifier::{IdGenerator, VideoId};

/// Content type recorded when an upload does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Metadata for one uploaded video.
///
/// Created once when an upload completes, never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Unique identifier, also the on-disk file name
    pub id: VideoId,
    /// Display name taken from the upload path, stored unsanitized
    pub name: String,
    /// MIME type served back on retrieval
    #[serde(rename = "type")]
    pub content_type: String,
}

impl VideoRecord {
    /// Creates a record.
    pub fn new(id: VideoId, name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            content_type: content_type.into(),
        }
    }

    /// Retrieval URL for this video.
    pub fn url(&self) -> String {
        format!("/videos/{}", self.id)
    }
}

/// Selection of records for [`MetadataStore::find`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFilter {
    /// Every record, in store order
    All,
    /// The record with this identifier
    Id(VideoId),
}

impl RecordFilter {
    /// Whether `record` is selected by this filter.
    pub fn matches(&self, record: &VideoRecord) -> bool {
        match self {
            RecordFilter::All => true,
            RecordFilter::Id(id) => &record.id == id,
        }
    }
}

/// Errors raised by metadata stores.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Reading or appending the store file failed
    #[error("Metadata store I/O error: {source}")]
    Io {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// A record could not be encoded
    #[error("Record encoding failed: {source}")]
    Encoding {
        /// The underlying serialization error
        #[from]
        source: serde_json::Error,
    },
}

/// Record store keyed by string fields.
///
/// Implementations own their concurrency control: concurrent `find` and
/// `insert` calls must interleave safely.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Returns the records selected by `filter`, in store order.
    ///
    /// # Errors
    ///
    /// - `CatalogError::Io` - If the backing storage cannot be read
    async fn find(&self, filter: &RecordFilter) -> Result<Vec<VideoRecord>, CatalogError>;

    /// Appends a record.
    ///
    /// # Errors
    ///
    /// - `CatalogError::Io` - If the backing storage cannot be written
    /// - `CatalogError::Encoding` - If the record cannot be serialized
    async fn insert(&self, record: VideoRecord) -> Result<(), CatalogError>;
}

/// Catalog service over an injected store and identifier generator.
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn MetadataStore>,
    ids: Arc<dyn IdGenerator>,
}

impl Catalog {
    /// Creates a catalog service.
    pub fn new(store: Arc<dyn MetadataStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { store, ids }
    }

    /// Reserves an identifier for a new upload.
    pub fn allocate_id(&self) -> VideoId {
        self.ids.next_id()
    }

    /// Looks up a video by identifier.
    ///
    /// # Errors
    ///
    /// - `CatalogError` - If the store lookup fails
    pub async fn find_by_id(&self, id: &VideoId) -> Result<Option<VideoRecord>, CatalogError> {
        let mut records = self.store.find(&RecordFilter::Id(id.clone())).await?;
        debug!(%id, hits = records.len(), "Catalog lookup");
        Ok(if records.is_empty() {
            None
        } else {
            Some(records.swap_remove(0))
        })
    }

    /// Lists every video in store order.
    ///
    /// # Errors
    ///
    /// - `CatalogError` - If the store cannot be read
    pub async fn list_all(&self) -> Result<Vec<VideoRecord>, CatalogError> {
        self.store.find(&RecordFilter::All).await
    }

    /// Commits a record for a completed upload.
    ///
    /// # Errors
    ///
    /// - `CatalogError` - If the store rejects the write
    pub async fn insert(&self, record: VideoRecord) -> Result<(), CatalogError> {
        debug!(id = %record.id, name = %record.name, "Catalog insert");
        self.store.insert(record).await
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog").finish_non_exhaustive()
    }
}
