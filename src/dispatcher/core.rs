//! Dispatcher core module - hot path for request dispatch.
//!
//! Per request: look the path up in the current trie snapshot, resolve the
//! method, check a context out of the pool, run the dispatcher-wide chain
//! around the endpoint, and hand the response back. The pooled context is
//! returned by its guard on every exit path.

use std::sync::Arc;

use tracing::debug;

use crate::context::{Request, Response};
use crate::context_pool::ContextPool;
use crate::handler::Handler;
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::middleware::{middleware, BoxedMiddleware, Chain, Recovery};
use crate::router::Router;

/// Routes requests to their endpoints
///
/// `Send + Sync`; share one instance behind an `Arc` across every
/// connection.
pub struct Dispatcher {
    router: Arc<Router>,
    pool: ContextPool,
    /// Dispatcher-wide chain, first element outermost
    middleware: Vec<BoxedMiddleware>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("router", &self.router)
            .field("pool", &self.pool)
            .field(
                "middleware",
                &self.middleware.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Dispatcher {
    /// Dispatcher with an env-configured pool and [`Recovery`] installed.
    #[must_use]
    pub fn new(router: Arc<Router>) -> Self {
        Self::with_pool(router, ContextPool::from_env())
    }

    #[must_use]
    pub fn with_pool(router: Arc<Router>, pool: ContextPool) -> Self {
        Self {
            router,
            pool,
            middleware: vec![middleware(Recovery)],
        }
    }

    /// Append dispatcher-wide middleware. It runs inside anything added
    /// earlier, including the default [`Recovery`].
    pub fn use_middleware(&mut self, mw: BoxedMiddleware) -> &mut Self {
        debug!(middleware = mw.name(), "Dispatcher middleware added");
        self.middleware.push(mw);
        self
    }

    /// Remove all dispatcher-wide middleware, including [`Recovery`].
    ///
    /// Without recovery a handler panic unwinds out of
    /// [`dispatch`](Self::dispatch); the pooled context is still released.
    pub fn clear_middleware(&mut self) -> &mut Self {
        self.middleware.clear();
        self
    }

    #[must_use]
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    #[must_use]
    pub fn pool(&self) -> &ContextPool {
        &self.pool
    }

    /// Serve one request, producing exactly one response.
    ///
    /// - no route for the path: `404`
    /// - route without the request method: `405` with an `allow` header
    /// - otherwise whatever the chain wrote (an untouched response is an
    ///   empty `200`)
    #[must_use]
    pub fn dispatch(&self, request: Request) -> Response {
        let trie = self.router.snapshot();

        let Some(found) = trie.find(&request.path) else {
            debug!(
                method = %request.method,
                path = %request.path,
                "Route not found"
            );
            return Self::not_found(&request);
        };

        let Some(endpoint) = found.endpoint(&request.method) else {
            let allow = found.node.handlers().allow_header();
            debug!(
                method = %request.method,
                path = %request.path,
                allow = %allow,
                "Method not allowed"
            );
            let mut response = Response::json_value(
                405,
                &serde_json::json!({
                    "error": "Method Not Allowed",
                    "method": request.method.as_str(),
                    "path": request.path,
                }),
            );
            response.set_header("allow", allow);
            return response;
        };

        let request_id = RequestId::from_header_or_new(request.header(REQUEST_ID_HEADER));
        let handler = endpoint.handler.as_ref();

        let mut ctx = self.pool.acquire();
        ctx.prepare(
            request,
            found.params,
            Arc::clone(&endpoint.pattern),
            endpoint.method.clone(),
            request_id,
        );

        Chain {
            middleware: &self.middleware,
            endpoint: handler,
        }
        .call(&mut ctx);

        let mut response = ctx.take_response();
        drop(ctx);

        if response.header(REQUEST_ID_HEADER).is_none() {
            response.set_header(REQUEST_ID_HEADER, request_id.to_string());
        }
        response
    }

    fn not_found(request: &Request) -> Response {
        Response::json_value(
            404,
            &serde_json::json!({
                "error": "Not Found",
                "method": request.method.as_str(),
                "path": request.path,
            }),
        )
    }
}
