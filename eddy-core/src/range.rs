//! HTTP `Range` header resolution.
//!
//! Turns a raw `Range` header value and a known content length into a single
//! inclusive byte interval. Only the first `start-end` token is honored, so
//! multi-range requests degrade to their first range. Anything without such a
//! token means "no range": the whole resource is served with status 200.
//!
//! Resolved intervals are not validated against the content length; callers
//! clamp or reject them.

use std::sync::LazyLock;

use regex::Regex;

static RANGE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]*-[0-9]*").expect("range token pattern compiles"));

/// Inclusive byte interval `[start, end]` requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte to serve
    pub start: u64,
    /// Last byte to serve, inclusive
    pub end: u64,
}

impl ByteRange {
    /// Creates an inclusive range.
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of bytes covered, zero when `start > end`.
    pub fn len(&self) -> u64 {
        if self.start > self.end {
            0
        } else {
            self.end - self.start + 1
        }
    }

    /// Whether the interval is inverted and covers nothing.
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Resolves a `Range` header value against a resource of `total_length` bytes.
///
/// Token forms, where `0` is a valid bound like any other number:
/// - `a-b` gives `[a, b]`
/// - `a-` gives `[a, total_length - 1]`
/// - `-n` gives `[total_length - n - 1, total_length - 1]`
/// - `-` gives `[0, total_length - 1]`, still counted as a range request
///
/// Returns `None` for a missing header, a header without a token, numbers
/// that overflow, or a length-relative token on an empty resource.
///
/// # Examples
/// ```
/// use eddy_core::range::{ByteRange, resolve_range};
///
/// assert_eq!(resolve_range(Some("bytes=100-200"), 1000), Some(ByteRange::new(100, 200)));
/// assert_eq!(resolve_range(Some("bytes=-100"), 1000), Some(ByteRange::new(899, 999)));
/// assert_eq!(resolve_range(None, 1000), None);
/// ```
pub fn resolve_range(header: Option<&str>, total_length: u64) -> Option<ByteRange> {
    let token = RANGE_TOKEN.find(header?)?;
    resolve_token(token.as_str(), total_length)
}

fn resolve_token(token: &str, total_length: u64) -> Option<ByteRange> {
    let (lesser, greater) = token.split_once('-')?;
    let lesser = parse_bound(lesser)?;
    let greater = parse_bound(greater)?;
    let last_byte = total_length.checked_sub(1);

    match (lesser, greater) {
        (Some(start), Some(end)) => Some(ByteRange::new(start, end)),
        (Some(start), None) => Some(ByteRange::new(start, last_byte?)),
        (None, Some(suffix)) => {
            let last = last_byte?;
            Some(ByteRange::new(
                total_length.saturating_sub(suffix.saturating_add(1)),
                last,
            ))
        }
        (None, None) => Some(ByteRange::new(0, last_byte?)),
    }
}

/// `Some(None)` for an omitted bound, `None` when the digits overflow.
fn parse_bound(digits: &str) -> Option<Option<u64>> {
    if digits.is_empty() {
        Some(None)
    } else {
        digits.parse::<u64>().ok().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_missing_header_is_no_range() {
        assert_eq!(resolve_range(None, 1000), None);
    }

    #[test]
    fn test_header_without_token_is_no_range() {
        assert_eq!(resolve_range(Some("bytes=abc"), 1000), None);
        assert_eq!(resolve_range(Some(""), 1000), None);
    }

    #[test]
    fn test_explicit_range() {
        assert_eq!(
            resolve_range(Some("bytes=100-199"), 1000),
            Some(ByteRange::new(100, 199))
        );
    }

    #[test]
    fn test_open_end_range() {
        assert_eq!(
            resolve_range(Some("bytes=500-"), 1000),
            Some(ByteRange::new(500, 999))
        );
    }

    #[test]
    fn test_suffix_range() {
        assert_eq!(
            resolve_range(Some("bytes=-100"), 1000),
            Some(ByteRange::new(899, 999))
        );
    }

    #[test]
    fn test_suffix_longer_than_resource_starts_at_zero() {
        assert_eq!(
            resolve_range(Some("bytes=-5000"), 1000),
            Some(ByteRange::new(0, 999))
        );
    }

    #[test]
    fn test_bare_dash_is_whole_resource_range() {
        assert_eq!(
            resolve_range(Some("bytes=-"), 1000),
            Some(ByteRange::new(0, 999))
        );
    }

    #[test]
    fn test_zero_bounds_are_present() {
        assert_eq!(
            resolve_range(Some("bytes=0-99"), 1000),
            Some(ByteRange::new(0, 99))
        );
        assert_eq!(
            resolve_range(Some("bytes=0-"), 1000),
            Some(ByteRange::new(0, 999))
        );
        assert_eq!(
            resolve_range(Some("bytes=0-0"), 1000),
            Some(ByteRange::new(0, 0))
        );
        assert_eq!(
            resolve_range(Some("bytes=-0"), 1000),
            Some(ByteRange::new(999, 999))
        );
    }

    #[test]
    fn test_only_first_range_is_honored() {
        assert_eq!(
            resolve_range(Some("bytes=0-10, 20-30, 40-"), 1000),
            Some(ByteRange::new(0, 10))
        );
    }

    #[test]
    fn test_bounds_are_not_validated() {
        assert_eq!(
            resolve_range(Some("bytes=900-100"), 1000),
            Some(ByteRange::new(900, 100))
        );
        assert_eq!(
            resolve_range(Some("bytes=5000-6000"), 1000),
            Some(ByteRange::new(5000, 6000))
        );
    }

    #[test]
    fn test_overflowing_bound_is_no_range() {
        assert_eq!(
            resolve_range(Some("bytes=99999999999999999999999-"), 1000),
            None
        );
    }

    #[test]
    fn test_empty_resource() {
        assert_eq!(resolve_range(Some("bytes=-"), 0), None);
        assert_eq!(resolve_range(Some("bytes=10-"), 0), None);
        assert_eq!(resolve_range(Some("bytes=-10"), 0), None);
        assert_eq!(
            resolve_range(Some("bytes=0-10"), 0),
            Some(ByteRange::new(0, 10))
        );
    }

    #[test]
    fn test_byte_range_len() {
        assert_eq!(ByteRange::new(0, 99).len(), 100);
        assert_eq!(ByteRange::new(5, 5).len(), 1);
        assert!(ByteRange::new(6, 5).is_empty());
        assert_eq!(ByteRange::new(6, 5).len(), 0);
    }

    proptest! {
        #[test]
        fn prop_absent_header_never_resolves(total in 1u64..u64::MAX) {
            prop_assert_eq!(resolve_range(None, total), None);
        }

        #[test]
        fn prop_explicit_range_ignores_length(a in 0u64..1 << 40, b in 0u64..1 << 40, total in 0u64..1 << 40) {
            let header = format!("bytes={a}-{b}");
            prop_assert_eq!(resolve_range(Some(&header), total), Some(ByteRange::new(a, b)));
        }

        #[test]
        fn prop_open_end_runs_to_last_byte(a in 0u64..1 << 40, total in 1u64..1 << 40) {
            let header = format!("bytes={a}-");
            prop_assert_eq!(resolve_range(Some(&header), total), Some(ByteRange::new(a, total - 1)));
        }

        #[test]
        fn prop_suffix_counts_back_from_end(n in 0u64..1 << 20, extra in 1u64..1 << 20) {
            let total = n + extra;
            let header = format!("bytes=-{n}");
            prop_assert_eq!(
                resolve_range(Some(&header), total),
                Some(ByteRange::new(total - n - 1, total - 1))
            );
        }
    }
}
