//! Handler contract.
//!
//! A handler is a single-argument callable over the per-request
//! [`RequestContext`]. It writes its response through the context's emitters
//! (`json`, `string`, `html`, `xml`) and returns nothing; failures are
//! expressed as error responses, or as panics caught by the recovery layer.

use std::sync::Arc;

use crate::context::RequestContext;

/// Something that can serve a matched request
pub trait Handler: Send + Sync {
    fn call(&self, ctx: &mut RequestContext);
}

impl<F> Handler for F
where
    F: Fn(&mut RequestContext) + Send + Sync,
{
    #[inline]
    fn call(&self, ctx: &mut RequestContext) {
        self(ctx)
    }
}

/// Shared, type-erased handler as stored in the route trie
pub type BoxedHandler = Arc<dyn Handler>;

/// Erase a concrete handler into a [`BoxedHandler`].
pub fn boxed<H: Handler + 'static>(handler: H) -> BoxedHandler {
    Arc::new(handler)
}
