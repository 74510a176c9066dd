use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::error;

use super::Middleware;
use crate::context::RequestContext;
use crate::handler::Handler;

/// Turns a panic anywhere inside the chain into a `500`
///
/// Whatever the handler had written is discarded and replaced with
/// `{"error":"Internal Server Error"}`. The dispatcher installs this as the
/// outermost middleware unless told otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct Recovery;

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl Middleware for Recovery {
    fn handle(&self, ctx: &mut RequestContext, next: &dyn Handler) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| next.call(ctx)));
        if let Err(payload) = outcome {
            let message = panic_message(payload.as_ref());
            error!(
                method = ?ctx.method(),
                path = %ctx.path(),
                pattern = ?ctx.matched_pattern(),
                request_id = ?ctx.request_id().map(|id| id.to_string()),
                panic_message = %message,
                "Handler panicked, responding 500"
            );
            ctx.response_mut().reset();
            ctx.json(500, &serde_json::json!({ "error": "Internal Server Error" }));
        }
    }

    fn name(&self) -> &'static str {
        "recovery"
    }
}
