//! Route pattern parsing
//!
//! A pattern is split with the same segmenter used for request paths and each
//! segment is classified as static text, a named parameter (`:id`) or a
//! trailing wildcard (`*rest`).

use super::error::RouterError;
use crate::segment::segments;

/// One segment of a registered route pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSegment<'a> {
    /// Literal text, matched by equality
    Static(&'a str),
    /// `:name` - binds exactly one request segment
    Param(&'a str),
    /// `*name` - binds every remaining request segment, possibly none
    Wildcard(&'a str),
}

impl<'a> PatternSegment<'a> {
    fn classify(raw: &'a str) -> Self {
        if let Some(name) = raw.strip_prefix(':') {
            PatternSegment::Param(name)
        } else if let Some(name) = raw.strip_prefix('*') {
            PatternSegment::Wildcard(name)
        } else {
            PatternSegment::Static(raw)
        }
    }
}

/// A validated route pattern
///
/// Holds the normalized pattern string (always starting with `/`) and its
/// classified segments, borrowing from the normalized string's owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    normalized: String,
}

impl PathPattern {
    /// Normalize and validate `raw`
    ///
    /// A missing leading slash is added and an empty pattern becomes `/`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::MalformedPattern`] when a wildcard is not the
    /// final segment, or when a parameter or wildcard segment has no name.
    pub fn parse(raw: &str) -> Result<Self, RouterError> {
        let normalized = if raw.starts_with('/') {
            raw.to_string()
        } else {
            format!("/{raw}")
        };

        let mut seen_wildcard = false;
        for seg in segments(&normalized) {
            if seen_wildcard {
                return Err(RouterError::MalformedPattern {
                    pattern: raw.to_string(),
                    reason: "wildcard segment must be the last segment",
                });
            }
            match PatternSegment::classify(seg) {
                PatternSegment::Param("") => {
                    return Err(RouterError::MalformedPattern {
                        pattern: raw.to_string(),
                        reason: "parameter segment has no name",
                    });
                }
                PatternSegment::Wildcard("") => {
                    return Err(RouterError::MalformedPattern {
                        pattern: raw.to_string(),
                        reason: "wildcard segment has no name",
                    });
                }
                PatternSegment::Wildcard(_) => seen_wildcard = true,
                PatternSegment::Param(_) | PatternSegment::Static(_) => {}
            }
        }

        Ok(Self { normalized })
    }

    /// The normalized pattern text, e.g. `/user/:id`
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// Classified segments in order
    pub fn segments(&self) -> impl Iterator<Item = PatternSegment<'_>> + '_ {
        segments(&self.normalized).map(PatternSegment::classify)
    }

    /// Whether the pattern contains no parameter or wildcard segments
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.segments()
            .all(|s| matches!(s, PatternSegment::Static(_)))
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.normalized)
    }
}
