//! Router core - registration front-end over the route trie.
//!
//! The trie is published as an immutable snapshot through `ArcSwap`.
//! Registration clones the current snapshot, inserts into the clone and
//! swaps it in, so lookups never take a lock and never observe a
//! half-applied insert. [`Router::batch`] stages many routes on one copy, so
//! bulk registration pays for a single clone.

use std::sync::Arc;

use arc_swap::ArcSwap;
use http::Method;
use parking_lot::Mutex;
use smallvec::SmallVec;
use tracing::{debug, info};

use super::error::RouterError;
use super::trie::RouteTrie;
use crate::handler::{boxed, Handler};
use crate::middleware::{compose, BoxedMiddleware};
use crate::segment::join_path;

/// Maximum number of path parameters before heap allocation.
/// Most REST routes bind four or fewer (e.g. `/users/:id/posts/:post_id`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Names are `Arc<str>` shared with the trie node that binds them; values
/// are per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Route registry and lookup front-end
///
/// Cheap to share: lookups go through [`snapshot`](Self::snapshot), which
/// only bumps a reference count. Registration takes `&self` and may happen
/// while requests are being served.
pub struct Router {
    trie: ArcSwap<RouteTrie>,
    /// Serializes writers so concurrent registrations do not lose each other.
    write_lock: Mutex<()>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.trie.load().len())
            .finish()
    }
}

macro_rules! verb {
    ($(#[$doc:meta])* $name:ident, $method:expr) => {
        $(#[$doc])*
        ///
        /// # Errors
        ///
        /// See [`Router::add`].
        pub fn $name<H: Handler + 'static>(
            &self,
            pattern: &str,
            handler: H,
            middleware: &[BoxedMiddleware],
        ) -> Result<(), RouterError> {
            self.add($method, pattern, handler, middleware)
        }
    };
}

macro_rules! batch_verb {
    ($(#[$doc:meta])* $name:ident, $method:expr) => {
        $(#[$doc])*
        ///
        /// # Errors
        ///
        /// See [`Batch::add`].
        pub fn $name<H: Handler + 'static>(
            &mut self,
            pattern: &str,
            handler: H,
            middleware: &[BoxedMiddleware],
        ) -> Result<(), RouterError> {
            self.add($method, pattern, handler, middleware)
        }
    };
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self {
            trie: ArcSwap::from_pointee(RouteTrie::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Current trie snapshot for lookups
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Arc<RouteTrie> {
        self.trie.load_full()
    }

    /// Register `handler` for `method` on `pattern`, wrapped in `middleware`
    /// (first element outermost).
    ///
    /// # Errors
    ///
    /// Any [`RouterError`] from validation. The published route table is
    /// unchanged on error.
    pub fn add<H: Handler + 'static>(
        &self,
        method: Method,
        pattern: &str,
        handler: H,
        middleware: &[BoxedMiddleware],
    ) -> Result<(), RouterError> {
        let composed = compose(boxed(handler), middleware);

        let _guard = self.write_lock.lock();
        let mut next = RouteTrie::clone(&self.trie.load());
        next.insert(pattern, &method, composed)?;
        let total = next.len();
        self.trie.store(Arc::new(next));

        info!(
            method = %method,
            pattern = %pattern,
            middleware_count = middleware.len(),
            routes_count = total,
            "Route registered"
        );
        Ok(())
    }

    verb!(
        /// Register a `GET` route.
        get, Method::GET
    );
    verb!(
        /// Register a `POST` route.
        post, Method::POST
    );
    verb!(
        /// Register a `PUT` route.
        put, Method::PUT
    );
    verb!(
        /// Register a `PATCH` route.
        patch, Method::PATCH
    );
    verb!(
        /// Register a `DELETE` route.
        delete, Method::DELETE
    );
    verb!(
        /// Register a `HEAD` route.
        head, Method::HEAD
    );
    verb!(
        /// Register an `OPTIONS` route.
        options, Method::OPTIONS
    );
    verb!(
        /// Register a `TRACE` route.
        trace, Method::TRACE
    );

    /// Register many routes with one snapshot clone and one publish.
    ///
    /// `build` registers into a private copy of the trie. The copy is
    /// published only if `build` returns `Ok`, so either every route in the
    /// batch becomes visible or none does. Other writers wait while the batch
    /// is open.
    ///
    /// ```rust
    /// use burrow::context::RequestContext;
    /// use burrow::router::Router;
    ///
    /// let router = Router::new();
    /// router
    ///     .batch(|b| {
    ///         b.get("/a", |ctx: &mut RequestContext| ctx.string(200, "a"), &[])?;
    ///         b.get("/b/:id", |ctx: &mut RequestContext| ctx.string(200, "b"), &[])
    ///     })
    ///     .unwrap();
    /// assert_eq!(router.len(), 2);
    /// ```
    ///
    /// # Errors
    ///
    /// The first [`RouterError`] returned by `build`.
    pub fn batch<F>(&self, build: F) -> Result<(), RouterError>
    where
        F: FnOnce(&mut Batch) -> Result<(), RouterError>,
    {
        let _guard = self.write_lock.lock();
        let mut batch = Batch {
            trie: RouteTrie::clone(&self.trie.load()),
            added: 0,
        };
        build(&mut batch)?;

        let total = batch.trie.len();
        let added = batch.added;
        self.trie.store(Arc::new(batch.trie));
        info!(
            registrations = added,
            routes_count = total,
            "Route batch registered"
        );
        Ok(())
    }

    /// Start a route group under `prefix`.
    #[must_use]
    pub fn group(&self, prefix: &str) -> Group<'_> {
        Group {
            router: self,
            prefix: prefix.to_string(),
            middleware: Vec::new(),
        }
    }

    /// Registered routes as `(method, pattern)`, sorted by pattern
    #[must_use]
    pub fn routes(&self) -> Vec<(Method, Arc<str>)> {
        self.trie.load().routes()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trie.load().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trie.load().is_empty()
    }

    /// Print the route table to stdout.
    pub fn dump_routes(&self) {
        let routes = self.routes();
        println!("[routes] count={}", routes.len());
        for (method, pattern) in routes {
            println!("[route] {method:<7} {pattern}");
        }
    }
}

/// Private trie copy being filled by [`Router::batch`]
pub struct Batch {
    trie: RouteTrie,
    added: usize,
}

impl std::fmt::Debug for Batch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batch")
            .field("routes", &self.trie.len())
            .field("added", &self.added)
            .finish()
    }
}

impl Batch {
    /// Register into the batch. Same validation as [`Router::add`].
    ///
    /// # Errors
    ///
    /// Any [`RouterError`] from validation; the batch copy is unchanged.
    pub fn add<H: Handler + 'static>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: H,
        middleware: &[BoxedMiddleware],
    ) -> Result<(), RouterError> {
        let composed = compose(boxed(handler), middleware);
        self.trie.insert(pattern, &method, composed)?;
        self.added += 1;
        debug!(method = %method, pattern = %pattern, "Route staged in batch");
        Ok(())
    }

    /// Registrations staged so far
    #[must_use]
    pub fn added(&self) -> usize {
        self.added
    }

    batch_verb!(
        /// Stage a `GET` route.
        get, Method::GET
    );
    batch_verb!(
        /// Stage a `POST` route.
        post, Method::POST
    );
    batch_verb!(
        /// Stage a `PUT` route.
        put, Method::PUT
    );
    batch_verb!(
        /// Stage a `PATCH` route.
        patch, Method::PATCH
    );
    batch_verb!(
        /// Stage a `DELETE` route.
        delete, Method::DELETE
    );
    batch_verb!(
        /// Stage a `HEAD` route.
        head, Method::HEAD
    );
    batch_verb!(
        /// Stage an `OPTIONS` route.
        options, Method::OPTIONS
    );
    batch_verb!(
        /// Stage a `TRACE` route.
        trace, Method::TRACE
    );
}

/// Routes sharing a path prefix and a middleware list
///
/// Group middleware wraps outside any per-route middleware. Middleware added
/// with [`use_middleware`](Self::use_middleware) only applies to routes
/// registered through the group afterwards.
pub struct Group<'r> {
    router: &'r Router,
    prefix: String,
    middleware: Vec<BoxedMiddleware>,
}

macro_rules! group_verb {
    ($(#[$doc:meta])* $name:ident, $method:expr) => {
        $(#[$doc])*
        ///
        /// # Errors
        ///
        /// See [`Router::add`].
        pub fn $name<H: Handler + 'static>(
            &self,
            pattern: &str,
            handler: H,
            middleware: &[BoxedMiddleware],
        ) -> Result<(), RouterError> {
            self.add($method, pattern, handler, middleware)
        }
    };
}

impl<'r> Group<'r> {
    /// Append middleware to the group's chain.
    pub fn use_middleware(&mut self, middleware: BoxedMiddleware) -> &mut Self {
        debug!(
            prefix = %self.prefix,
            middleware = middleware.name(),
            "Group middleware added"
        );
        self.middleware.push(middleware);
        self
    }

    /// Nested group; inherits this group's prefix and middleware.
    #[must_use]
    pub fn group(&self, prefix: &str) -> Group<'r> {
        Group {
            router: self.router,
            prefix: join_path(&self.prefix, prefix),
            middleware: self.middleware.clone(),
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Register under the group prefix, group middleware outermost.
    ///
    /// # Errors
    ///
    /// See [`Router::add`].
    pub fn add<H: Handler + 'static>(
        &self,
        method: Method,
        pattern: &str,
        handler: H,
        middleware: &[BoxedMiddleware],
    ) -> Result<(), RouterError> {
        let full = join_path(&self.prefix, pattern);
        let mut chain = Vec::with_capacity(self.middleware.len() + middleware.len());
        chain.extend(self.middleware.iter().map(Arc::clone));
        chain.extend(middleware.iter().map(Arc::clone));
        self.router.add(method, &full, handler, &chain)
    }

    group_verb!(
        /// Register a `GET` route in the group.
        get, Method::GET
    );
    group_verb!(
        /// Register a `POST` route in the group.
        post, Method::POST
    );
    group_verb!(
        /// Register a `PUT` route in the group.
        put, Method::PUT
    );
    group_verb!(
        /// Register a `PATCH` route in the group.
        patch, Method::PATCH
    );
    group_verb!(
        /// Register a `DELETE` route in the group.
        delete, Method::DELETE
    );
    group_verb!(
        /// Register a `HEAD` route in the group.
        head, Method::HEAD
    );
    group_verb!(
        /// Register an `OPTIONS` route in the group.
        options, Method::OPTIONS
    );
    group_verb!(
        /// Register a `TRACE` route in the group.
        trace, Method::TRACE
    );
}
