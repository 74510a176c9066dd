//! # Dispatcher Module
//!
//! Glue between the transport and the router: [`Dispatcher::dispatch`]
//! turns a [`Request`](crate::context::Request) into exactly one
//! [`Response`](crate::context::Response).
//!
//! ## Flow
//!
//! 1. Look the path up in the current route trie snapshot
//! 2. No node: `404 Not Found`
//! 3. Node without the request method: `405 Method Not Allowed` + `allow`
//! 4. Acquire a pooled [`RequestContext`](crate::context::RequestContext),
//!    bind request, params and route metadata
//! 5. Run the dispatcher-wide middleware (by default just
//!    [`Recovery`](crate::middleware::Recovery)) around the endpoint
//! 6. Take the response; the context goes back to the pool

mod core;

pub use core::Dispatcher;
