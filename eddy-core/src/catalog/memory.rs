//! Vector-backed metadata store, used by tests and throwaway runs.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CatalogError, MetadataStore, RecordFilter, VideoRecord};

/// Metadata store that forgets everything on drop.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<VideoRecord>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `records`.
    pub fn with_records(records: Vec<VideoRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl MetadataStore for InMemoryStore {
    async fn find(&self, filter: &RecordFilter) -> Result<Vec<VideoRecord>, CatalogError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    async fn insert(&self, record: VideoRecord) -> Result<(), CatalogError> {
        self.records.write().await.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::VideoId;

    #[tokio::test]
    async fn test_with_records_is_searchable() {
        let store = InMemoryStore::with_records(vec![
            VideoRecord::new(VideoId::new("1"), "one", "video/mp4"),
            VideoRecord::new(VideoId::new("2"), "two", "video/mp4"),
        ]);

        let hits = store
            .find(&RecordFilter::Id(VideoId::new("2")))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "two");
        assert_eq!(store.find(&RecordFilter::All).await.unwrap().len(), 2);
    }
}
