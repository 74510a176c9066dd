//! # Path Segmenter
//!
//! Splits URL paths into their non-empty, slash-delimited segments. Both route
//! registration and request matching go through the same segmenter, so a
//! pattern and a request path agree on what a "segment" is.
//!
//! Repeated separators collapse and leading/trailing slashes are ignored:
//!
//! ```rust
//! use burrow::segment::segment;
//!
//! assert_eq!(segment("//a//b/").as_slice(), &["a", "b"]);
//! assert!(segment("").is_empty());
//! assert!(segment("/").is_empty());
//! ```

use std::borrow::{Borrow, Cow};

use smallvec::SmallVec;

/// Number of segments kept inline before spilling to the heap.
/// Most REST paths are well under this depth.
pub const MAX_INLINE_SEGMENTS: usize = 16;

/// Stack-allocated segment list for the hot path.
pub type SegmentVec<'a> = SmallVec<[&'a str; MAX_INLINE_SEGMENTS]>;

/// Iterate the non-empty segments of `path` without allocating.
#[inline]
pub fn segments(path: &str) -> impl Iterator<Item = &str> + '_ {
    path.split('/').filter(|s| !s.is_empty())
}

/// Collect the non-empty segments of `path`.
///
/// Any string, including the empty string, maps to a (possibly empty)
/// sequence. Every returned segment has at least one character.
#[inline]
#[must_use]
pub fn segment(path: &str) -> SegmentVec<'_> {
    segments(path).collect()
}

/// Percent-decode one request segment.
///
/// Decoding happens after splitting, so `%2F` becomes a literal `/` inside
/// the segment and never introduces a new segment. Malformed escapes are
/// kept verbatim and invalid UTF-8 is replaced lossily. Segments without a
/// `%` are returned borrowed.
#[inline]
#[must_use]
pub fn decode_segment(seg: &str) -> Cow<'_, str> {
    if !seg.contains('%') {
        return Cow::Borrowed(seg);
    }
    let bytes = urlencoding::decode_binary(seg.as_bytes());
    Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
}

/// Rejoin segments with `/`, without a leading slash.
///
/// Used for wildcard captures, where `["css", "style.css"]` becomes
/// `css/style.css`.
#[must_use]
pub fn join_segments<S: Borrow<str>>(segs: &[S]) -> String {
    segs.join("/")
}

/// Join a group prefix and a route path with exactly one `/` between them.
#[must_use]
pub fn join_path(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        return path.to_string();
    }
    if path.is_empty() {
        return prefix.to_string();
    }
    let mut joined = String::with_capacity(prefix.len() + path.len() + 1);
    joined.push_str(prefix.trim_end_matches('/'));
    joined.push('/');
    joined.push_str(path.trim_start_matches('/'));
    joined
}
