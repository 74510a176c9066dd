use std::fmt;

/// Registration-time routing error
///
/// Returned by [`Router`](super::Router) registration methods and
/// [`RouteTrie::insert`](super::RouteTrie::insert). These are programmer
/// errors: they surface while the route table is being built, never while a
/// request is being served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// The pattern cannot be registered as written
    ///
    /// Raised when a wildcard segment is followed by further segments, or when
    /// a parameter/wildcard segment has no name (`:` or `*` alone).
    MalformedPattern {
        /// The pattern as supplied at registration
        pattern: String,
        /// What is wrong with it
        reason: &'static str,
    },
    /// A parameter or wildcard name disagrees with the name already bound at
    /// the same trie position
    ///
    /// `/users/:id` followed by `/users/:user_id/posts` would otherwise make
    /// the second route silently bind `id`.
    ParamNameConflict {
        /// The pattern being registered
        pattern: String,
        /// Name bound by an earlier registration
        existing: String,
        /// Name requested by this registration
        attempted: String,
    },
    /// The method is not one of GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS, TRACE
    UnsupportedMethod {
        /// The rejected method
        method: String,
    },
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::MalformedPattern { pattern, reason } => {
                write!(f, "malformed route pattern '{}': {}", pattern, reason)
            }
            RouterError::ParamNameConflict {
                pattern,
                existing,
                attempted,
            } => {
                write!(
                    f,
                    "route pattern '{}' binds '{}' where an earlier route already binds '{}'",
                    pattern, attempted, existing
                )
            }
            RouterError::UnsupportedMethod { method } => {
                write!(f, "unsupported HTTP method '{}'", method)
            }
        }
    }
}

impl std::error::Error for RouterError {}
