//! # Middleware
//!
//! Middleware wraps a handler: it sees the context before the handler runs,
//! decides whether to continue, and sees the response afterwards.
//!
//! Route and group middleware are composed into the handler once, at
//! registration time, by [`compose`]. Dispatcher-wide middleware is walked
//! per request without allocation.
//!
//! Built-in middleware:
//! - [`Recovery`] - converts panics into `500` responses
//! - [`RequestLogger`] - request span plus a completion event
//! - [`MetricsMiddleware`] - request, status-class and latency counters

mod core;
mod metrics;
mod recovery;
mod tracing;

pub use core::{compose, middleware, BoxedMiddleware, Middleware};
pub(crate) use core::Chain;
pub use metrics::{MetricsMiddleware, MetricsSnapshot};
pub use recovery::Recovery;
pub use tracing::RequestLogger;
