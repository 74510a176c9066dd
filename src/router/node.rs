use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::Method;

use super::method::MethodTable;
use crate::handler::BoxedHandler;

/// A routed handler together with the route that registered it.
///
/// The handler is already wrapped in its route and group middleware.
#[derive(Clone)]
pub struct Endpoint {
    pub handler: BoxedHandler,
    pub pattern: Arc<str>,
    pub method: Method,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("pattern", &self.pattern)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// One segment position in the route trie
///
/// Static children are keyed by their literal text. There is at most one
/// parameter child and one wildcard child; each stores the name it binds.
/// A wildcard child never has children of its own.
#[derive(Debug, Clone, Default)]
pub struct RouteNode {
    pub(crate) static_children: HashMap<Box<str>, RouteNode>,
    pub(crate) param_child: Option<Box<RouteNode>>,
    pub(crate) wildcard_child: Option<Box<RouteNode>>,
    /// Name bound when this node is a parameter or wildcard child
    pub(crate) name: Option<Arc<str>>,
    pub(crate) handlers: MethodTable<Endpoint>,
    /// Pattern of the route that terminates here, if any
    pub(crate) full_pattern: Option<Arc<str>>,
}

impl RouteNode {
    pub(crate) fn named(name: &str) -> Self {
        Self {
            name: Some(Arc::from(name)),
            ..Self::default()
        }
    }

    /// Endpoint registered for `method` on this node
    #[inline]
    #[must_use]
    pub fn endpoint(&self, method: &Method) -> Option<&Endpoint> {
        self.handlers.get(method)
    }

    #[must_use]
    pub fn handlers(&self) -> &MethodTable<Endpoint> {
        &self.handlers
    }

    /// A node is an endpoint once at least one route terminates on it.
    #[inline]
    #[must_use]
    pub fn is_endpoint(&self) -> bool {
        !self.handlers.is_empty()
    }

    #[must_use]
    pub fn full_pattern(&self) -> Option<&str> {
        self.full_pattern.as_deref()
    }

    /// Bound parameter or wildcard name
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Visit every endpoint beneath (and including) this node.
    pub(crate) fn walk<'a>(&'a self, out: &mut Vec<&'a Endpoint>) {
        out.extend(self.handlers.iter().map(|(_, e)| e));
        for child in self.static_children.values() {
            child.walk(out);
        }
        if let Some(child) = &self.param_child {
            child.walk(out);
        }
        if let Some(child) = &self.wildcard_child {
            child.walk(out);
        }
    }
}
