//! Append-only JSON lines table.
//!
//! Each table is a file `{dir}/{table}.jsonl` holding one JSON object per line.
//! The whole table is loaded on open and kept in memory; inserts append a line,
//! flush it, and only then become visible to `find`. Bytes past the last
//! committed line are cut off before the next append, so a failed write never
//! merges with the record after it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use super::{CatalogError, MetadataStore, RecordFilter, VideoRecord};

/// Persistent metadata store backed by a JSON lines file.
#[derive(Debug)]
pub struct JsonLinesStore {
    path: PathBuf,
    records: RwLock<Vec<VideoRecord>>,
    writer: Mutex<TableWriter>,
}

/// Append handle and the length of the table up to its last complete line.
#[derive(Debug)]
struct TableWriter {
    file: File,
    committed_len: u64,
}

impl TableWriter {
    /// Appends `line`, rolling the file back to the last complete line on failure.
    async fn append(&mut self, line: &[u8]) -> std::io::Result<()> {
        let actual_len = self.file.metadata().await?.len();
        if actual_len > self.committed_len {
            warn!(
                expected = self.committed_len,
                actual = actual_len,
                "Discarding partial metadata line"
            );
            self.file.set_len(self.committed_len).await?;
        }

        if let Err(e) = self.write_line(line).await {
            if let Err(rollback) = self.file.set_len(self.committed_len).await {
                warn!(error = %rollback, "Could not roll back partial metadata line");
            }
            return Err(e);
        }

        self.committed_len += line.len() as u64;
        Ok(())
    }

    async fn write_line(&mut self, line: &[u8]) -> std::io::Result<()> {
        self.file.write_all(line).await?;
        self.file.flush().await?;
        self.file.sync_data().await
    }
}

impl JsonLinesStore {
    /// Opens (creating if needed) the table `table` inside `dir`.
    ///
    /// Lines that fail to decode, such as a record torn by a crash mid-append,
    /// are skipped with a warning.
    ///
    /// # Errors
    ///
    /// - `CatalogError::Io` - If the directory or table file cannot be created or read
    pub async fn open(dir: &Path, table: &str) -> Result<Self, CatalogError> {
        fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{table}.jsonl"));

        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let records = decode_lines(&path, &contents);

        let mut writer = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        // Terminate a torn trailing line so the next append starts clean.
        if !contents.is_empty() && !contents.ends_with('\n') {
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        let committed_len = writer.metadata().await?.len();

        debug!(
            path = %path.display(),
            records = records.len(),
            "Opened metadata table"
        );

        Ok(Self {
            path,
            records: RwLock::new(records),
            writer: Mutex::new(TableWriter {
                file: writer,
                committed_len,
            }),
        })
    }

    /// Location of the table file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn decode_lines(path: &Path, contents: &str) -> Vec<VideoRecord> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| match serde_json::from_str(line) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping undecodable metadata record"
                );
                None
            }
        })
        .collect()
}

#[async_trait]
impl MetadataStore for JsonLinesStore {
    async fn find(&self, filter: &RecordFilter) -> Result<Vec<VideoRecord>, CatalogError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    async fn insert(&self, record: VideoRecord) -> Result<(), CatalogError> {
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        // Holding the writer across the in-memory push keeps file order and
        // memory order identical.
        let mut writer = self.writer.lock().await;
        writer.append(&line).await?;

        self.records.write().await.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::VideoId;

    fn record(id: &str, name: &str) -> VideoRecord {
        VideoRecord::new(VideoId::new(id), name, "video/mp4")
    }

    #[tokio::test]
    async fn test_open_creates_empty_table() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("database");

        let store = JsonLinesStore::open(&dir, "videos").await.unwrap();

        assert!(store.path().exists());
        assert!(store.find(&RecordFilter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();

        {
            let store = JsonLinesStore::open(temp_dir.path(), "videos").await.unwrap();
            store.insert(record("1", "first")).await.unwrap();
            store.insert(record("2", "second")).await.unwrap();
        }

        let store = JsonLinesStore::open(temp_dir.path(), "videos").await.unwrap();
        let all = store.find(&RecordFilter::All).await.unwrap();
        assert_eq!(all, vec![record("1", "first"), record("2", "second")]);

        let hit = store
            .find(&RecordFilter::Id(VideoId::new("2")))
            .await
            .unwrap();
        assert_eq!(hit, vec![record("2", "second")]);
    }

    #[tokio::test]
    async fn test_on_disk_format() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonLinesStore::open(temp_dir.path(), "videos").await.unwrap();
        store.insert(record("7", "a <b>")).await.unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            contents,
            "{\"id\":\"7\",\"name\":\"a <b>\",\"type\":\"video/mp4\"}\n"
        );
    }

    #[tokio::test]
    async fn test_torn_trailing_line_is_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("videos.jsonl");
        std::fs::write(
            &path,
            "{\"id\":\"1\",\"name\":\"ok\",\"type\":\"video/mp4\"}\n{\"id\":\"2\",\"na",
        )
        .unwrap();

        let store = JsonLinesStore::open(temp_dir.path(), "videos").await.unwrap();
        assert_eq!(
            store.find(&RecordFilter::All).await.unwrap(),
            vec![record("1", "ok")]
        );

        store.insert(record("3", "after")).await.unwrap();
        drop(store);

        let reopened = JsonLinesStore::open(temp_dir.path(), "videos").await.unwrap();
        assert_eq!(
            reopened.find(&RecordFilter::All).await.unwrap(),
            vec![record("1", "ok"), record("3", "after")]
        );
    }

    #[tokio::test]
    async fn test_partial_line_from_failed_write_is_discarded() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonLinesStore::open(temp_dir.path(), "videos").await.unwrap();
        store.insert(record("1", "first")).await.unwrap();

        // What an interrupted append leaves behind.
        {
            use std::io::Write;
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(store.path())
                .unwrap();
            file.write_all(b"{\"id\":\"2\",\"na").unwrap();
        }

        store.insert(record("3", "third")).await.unwrap();
        assert_eq!(store.find(&RecordFilter::All).await.unwrap().len(), 2);
        drop(store);

        let reopened = JsonLinesStore::open(temp_dir.path(), "videos").await.unwrap();
        assert_eq!(
            reopened.find(&RecordFilter::All).await.unwrap(),
            vec![record("1", "first"), record("3", "third")]
        );
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        let records = decode_lines(
            Path::new("videos.jsonl"),
            "\n{\"id\":\"1\",\"name\":\"x\",\"type\":\"t\"}\n\n",
        );
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_open_from_blocking_context() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = tokio_test::block_on(JsonLinesStore::open(temp_dir.path(), "videos")).unwrap();
        assert!(store.path().ends_with("videos.jsonl"));
    }
}
