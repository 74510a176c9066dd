//! Segment trie holding every registered route.
//!
//! Insertion walks (and extends) one node per pattern segment. Lookup walks
//! one node per request segment with strict precedence at every level:
//! static child, then parameter child, then wildcard child. There is no
//! backtracking; once a branch is chosen the walk either succeeds on it or
//! the path does not match.

use std::borrow::Cow;
use std::sync::Arc;

use http::Method;
use smallvec::SmallVec;
use tracing::warn;

use super::core::ParamVec;
use super::error::RouterError;
use super::method::{self, slot};
use super::node::{Endpoint, RouteNode};
use super::pattern::{PathPattern, PatternSegment};
use crate::handler::BoxedHandler;
use crate::segment::{decode_segment, join_segments, segments, MAX_INLINE_SEGMENTS};

/// Result of a successful path lookup
///
/// The node is an endpoint (has at least one handler); whether it has one
/// for the request method is for the caller to decide.
#[derive(Debug)]
pub struct TrieMatch<'t> {
    pub node: &'t RouteNode,
    pub params: ParamVec,
}

impl<'t> TrieMatch<'t> {
    /// Endpoint for `method` on the matched node
    #[inline]
    #[must_use]
    pub fn endpoint(&self, method: &Method) -> Option<&'t Endpoint> {
        self.node.endpoint(method)
    }

    /// Bound value for parameter `name`
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rev()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Route trie rooted at the empty path
#[derive(Debug, Clone, Default)]
pub struct RouteTrie {
    root: RouteNode,
    routes: usize,
}

impl RouteTrie {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered (pattern, method) routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes == 0
    }

    #[must_use]
    pub fn root(&self) -> &RouteNode {
        &self.root
    }

    /// Register `handler` for `method` on `pattern`.
    ///
    /// Re-registering the same pattern and method replaces the earlier handler.
    /// Nothing is modified when an error is returned.
    ///
    /// # Errors
    ///
    /// - [`RouterError::MalformedPattern`] for an invalid pattern
    /// - [`RouterError::UnsupportedMethod`] for a method outside the eight verbs
    /// - [`RouterError::ParamNameConflict`] when a parameter or wildcard name
    ///   differs from the one already bound at the same position
    pub fn insert(
        &mut self,
        pattern: &str,
        method: &Method,
        handler: BoxedHandler,
    ) -> Result<(), RouterError> {
        let pattern = PathPattern::parse(pattern)?;
        if !method::is_supported(method) {
            return Err(RouterError::UnsupportedMethod {
                method: method.to_string(),
            });
        }
        self.check_names(&pattern)?;

        let full: Arc<str> = Arc::from(pattern.as_str());
        let mut node = &mut self.root;
        for seg in pattern.segments() {
            node = match seg {
                PatternSegment::Static(text) => node
                    .static_children
                    .entry(Box::from(text))
                    .or_default(),
                PatternSegment::Param(name) => node
                    .param_child
                    .get_or_insert_with(|| Box::new(RouteNode::named(name)))
                    .as_mut(),
                PatternSegment::Wildcard(name) => node
                    .wildcard_child
                    .get_or_insert_with(|| Box::new(RouteNode::named(name)))
                    .as_mut(),
            };
        }

        let endpoint = Endpoint {
            handler,
            pattern: Arc::clone(&full),
            method: method.clone(),
        };
        let previous = node.handlers.insert(method, endpoint)?;
        node.full_pattern = Some(full);

        if previous.is_some() {
            warn!(
                method = %method,
                pattern = %pattern,
                "Route re-registered, replacing previous handler"
            );
        } else {
            self.routes += 1;
        }
        Ok(())
    }

    /// Read-only pass rejecting name conflicts before anything is created.
    fn check_names(&self, pattern: &PathPattern) -> Result<(), RouterError> {
        let conflict = |existing: &str, attempted: &str| RouterError::ParamNameConflict {
            pattern: pattern.as_str().to_string(),
            existing: existing.to_string(),
            attempted: attempted.to_string(),
        };

        let mut node = &self.root;
        for seg in pattern.segments() {
            let next = match seg {
                PatternSegment::Static(text) => node.static_children.get(text),
                PatternSegment::Param(name) => match node.param_child.as_deref() {
                    Some(child) => match child.name() {
                        Some(existing) if existing != name => {
                            return Err(conflict(existing, name));
                        }
                        _ => Some(child),
                    },
                    None => None,
                },
                PatternSegment::Wildcard(name) => match node.wildcard_child.as_deref() {
                    Some(child) => match child.name() {
                        Some(existing) if existing != name => {
                            return Err(conflict(existing, name));
                        }
                        _ => Some(child),
                    },
                    None => None,
                },
            };
            match next {
                Some(child) => node = child,
                // The rest of the branch is new, so nothing further can clash.
                None => return Ok(()),
            }
        }
        Ok(())
    }

    /// Resolve `path` to an endpoint node, binding parameters along the way.
    ///
    /// Returns `None` when no branch matches or when the walk ends on a node
    /// with no handlers. A walk that consumes every segment and stops on such a
    /// node continues into its wildcard child with an empty capture, so
    /// `/static/*filepath` matches `/static`.
    ///
    /// Request segments are percent-decoded before matching; patterns are
    /// compared in their literal form. `%2F` decodes inside its segment and
    /// does not split it.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<TrieMatch<'_>> {
        let segs: SmallVec<[Cow<'_, str>; MAX_INLINE_SEGMENTS]> =
            segments(path).map(decode_segment).collect();
        let mut params = ParamVec::new();
        let mut node = &self.root;
        let mut captured_rest = false;

        for (i, seg) in segs.iter().enumerate() {
            if let Some(child) = node.static_children.get(seg.as_ref()) {
                node = child;
            } else if let Some(child) = node.param_child.as_deref() {
                if let Some(name) = &child.name {
                    params.push((Arc::clone(name), seg.to_string()));
                }
                node = child;
            } else if let Some(child) = node.wildcard_child.as_deref() {
                if let Some(name) = &child.name {
                    params.push((Arc::clone(name), join_segments(&segs[i..])));
                }
                node = child;
                captured_rest = true;
                break;
            } else {
                return None;
            }
        }

        if !captured_rest && !node.is_endpoint() {
            if let Some(child) = node.wildcard_child.as_deref() {
                if let Some(name) = &child.name {
                    params.push((Arc::clone(name), String::new()));
                }
                node = child;
            }
        }

        if node.is_endpoint() {
            Some(TrieMatch { node, params })
        } else {
            None
        }
    }

    /// Every registered route as `(method, pattern)`, sorted by pattern then
    /// method table order.
    #[must_use]
    pub fn routes(&self) -> Vec<(Method, Arc<str>)> {
        let mut endpoints = Vec::with_capacity(self.routes);
        self.root.walk(&mut endpoints);
        endpoints.sort_by(|a, b| {
            a.pattern
                .cmp(&b.pattern)
                .then_with(|| slot(&a.method).cmp(&slot(&b.method)))
        });
        endpoints
            .into_iter()
            .map(|e| (e.method.clone(), Arc::clone(&e.pattern)))
            .collect()
    }
}
