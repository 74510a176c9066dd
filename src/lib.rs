//! # burrow
//!
//! **burrow** is an embeddable HTTP request router for Rust: a segment trie
//! with static, `:param` and `*wildcard` segments, composed middleware
//! chains, and pooled per-request contexts, served over the `may` coroutine
//! runtime.
//!
//! ## Architecture
//!
//! - **[`segment`]** - path segmentation shared by registration and lookup
//! - **[`router`]** - route trie, registration API and route groups
//! - **[`handler`]** / **[`middleware`]** - handler contract, middleware
//!   composition, recovery, request logging, metrics
//! - **[`context`]** - request, response and the per-request context
//! - **[`context_pool`]** - sharded pool of reusable contexts
//! - **[`dispatcher`]** - request to response: lookup, 404/405, invoke
//! - **[`server`]** - `may_minihttp` transport adapter
//! - **[`config`]** / **[`logging`]** - environment and YAML configuration,
//!   `tracing` setup
//!
//! ## Request flow
//!
//! ```text
//! wire request ─► server::AppService ─► Dispatcher::dispatch
//!                                         │
//!                     Router::snapshot ◄──┤ RouteTrie::find
//!                                         │   ├─ no node      → 404
//!                                         │   └─ no method    → 405 + allow
//!                                         ▼
//!                               ContextPool::acquire
//!                                         │
//!                     Recovery ► global mw ► group mw ► route mw ► handler
//!                                         │
//!                               guard drop → context reset + released
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use burrow::context::{Request, RequestContext};
//! use burrow::dispatcher::Dispatcher;
//! use burrow::router::Router;
//!
//! let router = Arc::new(Router::new());
//! router
//!     .get(
//!         "/user/:id",
//!         |ctx: &mut RequestContext| {
//!             let id = ctx.param("id").unwrap_or_default().to_string();
//!             ctx.json(200, &serde_json::json!({ "id": id }));
//!         },
//!         &[],
//!     )
//!     .unwrap();
//!
//! let dispatcher = Dispatcher::new(router);
//! let response = dispatcher.dispatch(Request::get("/user/42"));
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body_json()["id"], "42");
//!
//! let missing = dispatcher.dispatch(Request::post("/user/42"));
//! assert_eq!(missing.status, 405);
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod context_pool;
pub mod dispatcher;
pub mod echo;
pub mod handler;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod segment;
pub mod server;

pub use context::{Request, RequestContext, Response};
pub use dispatcher::Dispatcher;
pub use handler::Handler;
pub use middleware::Middleware;
pub use router::{Router, RouterError};
