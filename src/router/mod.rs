//! # Router Module
//!
//! Path matching and route registration.
//!
//! ## Overview
//!
//! Routes are stored in a segment trie ([`RouteTrie`]). Each node has
//! literal children keyed by segment text, at most one parameter child
//! (`:name`) and at most one wildcard child (`*name`), plus a fixed
//! [`MethodTable`] of endpoints.
//!
//! Lookup is strict and does not backtrack: at every level a literal child
//! wins over a parameter child, which wins over a wildcard child. A wildcard
//! captures the rest of the path, joined with `/`, possibly empty.
//!
//! ## Example
//!
//! ```rust
//! use burrow::context::RequestContext;
//! use burrow::router::Router;
//!
//! let router = Router::new();
//! router
//!     .get("/user/:id", |ctx: &mut RequestContext| ctx.string(200, "user"), &[])
//!     .unwrap();
//!
//! let trie = router.snapshot();
//! let m = trie.find("/user/42").unwrap();
//! assert_eq!(m.param("id"), Some("42"));
//! ```
//!
//! ## Concurrency
//!
//! [`Router`] publishes the trie through `ArcSwap`. Registration is
//! copy-on-write, so lookups run lock-free against an immutable snapshot.

mod core;
mod error;
mod method;
mod node;
mod pattern;
mod trie;

pub use core::{Batch, Group, ParamVec, Router, MAX_INLINE_PARAMS};
pub use error::RouterError;
pub use method::{is_supported, MethodTable, SUPPORTED_METHODS};
pub use node::{Endpoint, RouteNode};
pub use pattern::{PathPattern, PatternSegment};
pub use trie::{RouteTrie, TrieMatch};
