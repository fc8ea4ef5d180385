//! Sequential reader for a byte window of a file.

use std::io::{self, SeekFrom};
use std::ops::Range;

use bytes::{Bytes, BytesMut};
use futures::Stream;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::trace;

struct WindowCursor {
    file: File,
    position: u64,
    remaining: u64,
    buffer_size: usize,
    positioned: bool,
}

impl WindowCursor {
    async fn read_chunk(mut self) -> io::Result<Option<(Bytes, Self)>> {
        if self.remaining == 0 {
            return Ok(None);
        }

        if !self.positioned {
            self.file.seek(SeekFrom::Start(self.position)).await?;
            self.positioned = true;
        }

        let want = usize::try_from(self.remaining)
            .unwrap_or(usize::MAX)
            .min(self.buffer_size);
        let mut buffer = BytesMut::zeroed(want);
        let read = self.file.read(&mut buffer).await?;

        // The window was sized from the file length at open time; running dry
        // early means the file shrank underneath us.
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("file ended {} bytes before the window", self.remaining),
            ));
        }

        buffer.truncate(read);
        self.position += read as u64;
        self.remaining -= read as u64;
        trace!(
            position = self.position,
            remaining = self.remaining,
            "Read window chunk"
        );

        Ok(Some((buffer.freeze(), self)))
    }
}

/// Streams exactly the bytes of `window` from `file`.
///
/// Reads are sequential, at most `buffer_size` bytes each, and happen only when
/// the consumer polls. Dropping the stream (for example on client disconnect)
/// closes the file. A file shorter than the window ends the stream with an
/// `UnexpectedEof` error.
pub fn stream_window(
    file: File,
    window: Range<u64>,
    buffer_size: usize,
) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
    let cursor = WindowCursor {
        file,
        position: window.start,
        remaining: window.end.saturating_sub(window.start),
        buffer_size: buffer_size.max(1),
        positioned: false,
    };

    futures::stream::try_unfold(cursor, WindowCursor::read_chunk)
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;

    use super::*;

    async fn fixture(contents: &[u8]) -> (tempfile::TempDir, File) {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("video");
        tokio::fs::write(&path, contents).await.unwrap();
        let file = File::open(&path).await.unwrap();
        (temp_dir, file)
    }

    async fn collect(stream: impl Stream<Item = io::Result<Bytes>>) -> io::Result<Vec<Bytes>> {
        stream.try_collect().await
    }

    #[tokio::test]
    async fn test_streams_exact_window() {
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let (_dir, file) = fixture(&data).await;

        let chunks = collect(stream_window(file, 100..200, 64)).await.unwrap();
        let joined: Vec<u8> = chunks.concat();

        assert_eq!(joined, &data[100..200]);
    }

    #[tokio::test]
    async fn test_chunks_never_exceed_buffer_size() {
        let data = vec![7u8; 10_000];
        let (_dir, file) = fixture(&data).await;

        let chunks = collect(stream_window(file, 0..10_000, 4096)).await.unwrap();

        assert!(chunks.iter().all(|chunk| chunk.len() <= 4096));
        assert_eq!(chunks.iter().map(Bytes::len).sum::<usize>(), 10_000);
    }

    #[tokio::test]
    async fn test_empty_window_yields_nothing() {
        let (_dir, file) = fixture(b"abc").await;
        let chunks = collect(stream_window(file, 0..0, 16)).await.unwrap();
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn test_window_past_end_of_file_errors() {
        let (_dir, file) = fixture(b"abc").await;

        let err = collect(stream_window(file, 1..10, 16)).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    /// Whether this process holds an open descriptor for `path`.
    #[cfg(target_os = "linux")]
    fn holds_descriptor(path: &std::path::Path) -> bool {
        std::fs::read_dir("/proc/self/fd")
            .unwrap()
            .filter_map(Result::ok)
            .filter_map(|entry| std::fs::read_link(entry.path()).ok())
            .any(|target| target == path)
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_dropping_stream_midway_releases_file() {
        use futures::StreamExt;

        let (temp_dir, file) = fixture(&[1u8; 10_000]).await;
        let path = temp_dir.path().canonicalize().unwrap().join("video");

        let mut stream = Box::pin(stream_window(file, 0..10_000, 1024));
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.len(), 1024);
        assert!(holds_descriptor(&path));

        // Client went away before the window was fully sent.
        drop(stream);

        assert!(!holds_descriptor(&path));
        std::fs::remove_file(&path).unwrap();
    }
}
