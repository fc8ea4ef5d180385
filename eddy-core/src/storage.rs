//! On-disk layout for uploaded videos.
//!
//! Every video is a single file in the videos directory, named by its
//! identifier. Nothing here knows about the catalog: a file may exist without a
//! record (an aborted upload) and a record may outlive its file.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};
use tracing::debug;

use crate::identifier::VideoId;

/// Errors that occur while touching video files.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Identifier cannot be used as a file name
    #[error("Invalid video id for storage: {id:?}")]
    InvalidId {
        /// The rejected identifier
        id: String,
    },

    /// Underlying I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },
}

/// An opened video file and its size at open time.
#[derive(Debug)]
pub struct OpenedVideo {
    /// Read handle positioned at the start of the file
    pub file: File,
    /// Length in bytes when the file was opened
    pub total_length: u64,
}

/// Directory of uploaded video files.
#[derive(Debug, Clone)]
pub struct VideoStorage {
    videos_dir: PathBuf,
}

impl VideoStorage {
    /// Creates storage rooted at `videos_dir`. The directory is not touched.
    pub fn new(videos_dir: impl Into<PathBuf>) -> Self {
        Self {
            videos_dir: videos_dir.into(),
        }
    }

    /// Root directory of the video files.
    pub fn videos_dir(&self) -> &Path {
        &self.videos_dir
    }

    /// Creates the videos directory if it is missing.
    ///
    /// # Errors
    ///
    /// - `StorageError::Io` - If the directory cannot be created
    pub async fn ensure_directory(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.videos_dir).await?;
        Ok(())
    }

    /// File path for `id`.
    ///
    /// # Errors
    ///
    /// - `StorageError::InvalidId` - If `id` is empty, a dot entry, or contains a separator
    pub fn path_for(&self, id: &VideoId) -> Result<PathBuf, StorageError> {
        let raw = id.as_str();
        if raw.is_empty() || raw == "." || raw == ".." || raw.contains(['/', '\\', '\0']) {
            return Err(StorageError::InvalidId { id: raw.to_string() });
        }
        Ok(self.videos_dir.join(raw))
    }

    /// Creates the file for a new upload. Never truncates an existing file.
    ///
    /// # Errors
    ///
    /// - `StorageError::InvalidId` - If `id` is not a valid file name
    /// - `StorageError::Io` - If the file exists already or cannot be created
    pub async fn create(&self, id: &VideoId) -> Result<File, StorageError> {
        let path = self.path_for(id)?;
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        debug!(path = %path.display(), "Created video file");
        Ok(file)
    }

    /// Opens the file for `id` for reading.
    ///
    /// Returns `Ok(None)` when no regular file exists for the identifier.
    ///
    /// # Errors
    ///
    /// - `StorageError::Io` - If the file exists but cannot be opened or inspected
    pub async fn open(&self, id: &VideoId) -> Result<Option<OpenedVideo>, StorageError> {
        let path = match self.path_for(id) {
            Ok(path) => path,
            Err(StorageError::InvalidId { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        open_regular_file(&path).await
    }
}

/// Opens `path` if it names a regular file.
///
/// Returns `Ok(None)` for directories and for paths that cannot name a file:
/// missing entries, a file used as a directory, over-long or invalid names.
///
/// # Errors
///
/// - `StorageError::Io` - If the file exists but cannot be opened or inspected
pub async fn open_regular_file(path: &Path) -> Result<Option<OpenedVideo>, StorageError> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if is_absent(&e) => {
            debug!(path = %path.display(), error = %e, "No file at path");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Ok(None);
    }

    Ok(Some(OpenedVideo {
        file,
        total_length: metadata.len(),
    }))
}

fn is_absent(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::NotFound
            | io::ErrorKind::NotADirectory
            | io::ErrorKind::InvalidInput
            | io::ErrorKind::InvalidFilename
    )
}
