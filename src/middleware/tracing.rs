use std::time::Instant;

use tracing::{info, info_span};

use super::Middleware;
use crate::context::RequestContext;
use crate::handler::Handler;

/// Logs every request inside a `request` span
///
/// The span carries method, path, matched pattern and request id; a
/// completion event records status and latency.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestLogger;

impl Middleware for RequestLogger {
    fn handle(&self, ctx: &mut RequestContext, next: &dyn Handler) {
        let span = info_span!(
            "request",
            method = ?ctx.method(),
            path = %ctx.path(),
            pattern = ctx.matched_pattern().unwrap_or(""),
            request_id = %ctx.request_id().map(|id| id.to_string()).unwrap_or_default(),
        );
        let _entered = span.enter();

        let start = Instant::now();
        next.call(ctx);
        let latency = start.elapsed();

        info!(
            status = ctx.response().status,
            latency_us = latency.as_micros() as u64,
            "Request completed"
        );
    }

    fn name(&self) -> &'static str {
        "request_logger"
    }
}
