//! Response window planning for video retrieval.
//!
//! A request without a range is answered in full. A range request is answered
//! with partial content, capped to a maximum chunk size so media players keep
//! issuing follow-up range requests while scrubbing instead of holding one huge
//! response open.

use std::ops::Range;

use crate::range::ByteRange;

/// How the planned window is framed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    /// 200, whole resource, `Content-Length` only
    Full,
    /// 206, `Content-Range` describes the window
    Partial,
}

impl ChunkStatus {
    /// HTTP status code for this framing.
    pub fn as_u16(self) -> u16 {
        match self {
            ChunkStatus::Full => 200,
            ChunkStatus::Partial => 206,
        }
    }
}

/// Window of a resource to send in one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    /// Response framing
    pub status: ChunkStatus,
    /// First byte of the window
    pub start: u64,
    /// Last byte of the window, inclusive. Meaningless for an empty full plan.
    pub end: u64,
    /// Size of the whole resource
    pub total_length: u64,
}

impl ChunkPlan {
    /// Bytes the response body carries.
    pub fn content_length(&self) -> u64 {
        match self.status {
            ChunkStatus::Full => self.total_length,
            ChunkStatus::Partial => ByteRange::new(self.start, self.end).len(),
        }
    }

    /// Half-open byte window for sequential readers.
    pub fn window(&self) -> Range<u64> {
        self.start..self.start.saturating_add(self.content_length())
    }

    /// `Content-Range` value for partial responses.
    pub fn content_range(&self) -> Option<String> {
        match self.status {
            ChunkStatus::Full => None,
            ChunkStatus::Partial => Some(format!(
                "bytes {}-{}/{}",
                self.start, self.end, self.total_length
            )),
        }
    }
}

/// Plans the response window for an optional resolved range.
///
/// Only the upper bound is ever lowered: a range longer than `max_chunk_size`
/// becomes `[start, start + max_chunk_size - 1]`. Shorter ranges pass through
/// unchanged. `max_chunk_size` must be non-zero.
///
/// # Examples
/// ```
/// use eddy_core::chunk::{ChunkStatus, plan_chunk};
/// use eddy_core::range::ByteRange;
///
/// let plan = plan_chunk(Some(ByteRange::new(0, 999_999)), 1_000_000, 262_144);
/// assert_eq!(plan.status, ChunkStatus::Partial);
/// assert_eq!((plan.start, plan.end), (0, 262_143));
/// ```
pub fn plan_chunk(range: Option<ByteRange>, total_length: u64, max_chunk_size: u64) -> ChunkPlan {
    match range {
        None => ChunkPlan {
            status: ChunkStatus::Full,
            start: 0,
            end: total_length.saturating_sub(1),
            total_length,
        },
        Some(ByteRange { start, end }) => {
            let capped_end = start.saturating_add(max_chunk_size.saturating_sub(1));
            ChunkPlan {
                status: ChunkStatus::Partial,
                start,
                end: end.min(capped_end),
                total_length,
            }
        }
    }
}
