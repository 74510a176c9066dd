use std::sync::Arc;

use crate::context::RequestContext;
use crate::handler::{BoxedHandler, Handler};

/// Cross-cutting request processing wrapped around a handler
///
/// `next` is the rest of the chain. Code before `next.call(ctx)` runs on the
/// way in, code after it on the way out. Not calling `next` short-circuits
/// the request; the middleware is then responsible for the response.
pub trait Middleware: Send + Sync {
    fn handle(&self, ctx: &mut RequestContext, next: &dyn Handler);

    /// Name used in logs and route dumps
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<F> Middleware for F
where
    F: Fn(&mut RequestContext, &dyn Handler) + Send + Sync,
{
    #[inline]
    fn handle(&self, ctx: &mut RequestContext, next: &dyn Handler) {
        self(ctx, next)
    }
}

/// Shared, type-erased middleware
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// Erase a concrete middleware into a [`BoxedMiddleware`].
pub fn middleware<M: Middleware + 'static>(mw: M) -> BoxedMiddleware {
    Arc::new(mw)
}

/// One layer of a composed handler
struct Layer {
    middleware: BoxedMiddleware,
    next: BoxedHandler,
}

impl Handler for Layer {
    #[inline]
    fn call(&self, ctx: &mut RequestContext) {
        self.middleware.handle(ctx, self.next.as_ref());
    }
}

/// Wrap `handler` in `middleware`, first element outermost.
///
/// The returned handler runs `middleware[0]` first on the way in and last on
/// the way out. An empty list returns `handler` unchanged.
#[must_use]
pub fn compose(handler: BoxedHandler, middleware: &[BoxedMiddleware]) -> BoxedHandler {
    middleware.iter().rev().fold(handler, |next, mw| {
        Arc::new(Layer {
            middleware: Arc::clone(mw),
            next,
        }) as BoxedHandler
    })
}

/// Borrowed chain walked by index at dispatch time
///
/// Used for dispatcher-wide middleware, so wrapping a matched endpoint
/// allocates nothing per request.
pub(crate) struct Chain<'a> {
    pub(crate) middleware: &'a [BoxedMiddleware],
    pub(crate) endpoint: &'a dyn Handler,
}

impl Handler for Chain<'_> {
    fn call(&self, ctx: &mut RequestContext) {
        match self.middleware.split_first() {
            Some((first, rest)) => first.handle(
                ctx,
                &Chain {
                    middleware: rest,
                    endpoint: self.endpoint,
                },
            ),
            None => self.endpoint.call(ctx),
        }
    }
}
