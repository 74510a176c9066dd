//! Middleware ordering, short-circuiting and the bundled middleware.

mod common;

use std::sync::Arc;

use burrow::context::{Request, RequestContext};
use burrow::dispatcher::Dispatcher;
use burrow::handler::Handler;
use burrow::middleware::{middleware, BoxedMiddleware, MetricsMiddleware, RequestLogger};
use burrow::router::Router;
use parking_lot::Mutex;

type Trace = Arc<Mutex<Vec<String>>>;

fn tracer(trace: &Trace, label: &'static str) -> BoxedMiddleware {
    let trace = Arc::clone(trace);
    middleware(move |ctx: &mut RequestContext, next: &dyn Handler| {
        trace.lock().push(format!("{label}:in"));
        next.call(ctx);
        trace.lock().push(format!("{label}:out"));
    })
}

fn recording_handler(trace: &Trace) -> impl Fn(&mut RequestContext) + Send + Sync + 'static {
    let trace = Arc::clone(trace);
    move |ctx: &mut RequestContext| {
        trace.lock().push("handler".to_string());
        ctx.string(200, "ok");
    }
}

#[test]
fn test_global_group_route_order() {
    let trace: Trace = Arc::default();
    let router = Arc::new(Router::new());
    {
        let mut api = router.group("/api");
        api.use_middleware(tracer(&trace, "group"));
        api.get(
            "/x",
            recording_handler(&trace),
            &[tracer(&trace, "route1"), tracer(&trace, "route2")],
        )
        .unwrap();
    }

    let mut dispatcher = Dispatcher::new(Arc::clone(&router));
    dispatcher.use_middleware(tracer(&trace, "global"));

    let response = dispatcher.dispatch(Request::get("/api/x"));
    assert_eq!(response.status, 200);
    assert_eq!(
        *trace.lock(),
        vec![
            "global:in",
            "group:in",
            "route1:in",
            "route2:in",
            "handler",
            "route2:out",
            "route1:out",
            "group:out",
            "global:out",
        ]
    );
}

#[test]
fn test_nested_group_inherits_middleware() {
    let trace: Trace = Arc::default();
    let router = Router::new();
    let mut outer = router.group("/a");
    outer.use_middleware(tracer(&trace, "outer"));
    let mut inner = outer.group("/b");
    inner.use_middleware(tracer(&trace, "inner"));
    inner.get("/c", recording_handler(&trace), &[]).unwrap();
    // Added after registration: does not affect /a/b/c.
    outer.use_middleware(tracer(&trace, "late"));

    let dispatcher = Dispatcher::new(Arc::new(router));
    dispatcher.dispatch(Request::get("/a/b/c"));
    assert_eq!(
        *trace.lock(),
        vec!["outer:in", "inner:in", "handler", "inner:out", "outer:out"]
    );
}

#[test]
fn test_short_circuit_skips_handler() {
    let trace: Trace = Arc::default();
    let guard = middleware(|ctx: &mut RequestContext, next: &dyn Handler| {
        if ctx.header("authorization").is_none() {
            ctx.json(401, &serde_json::json!({ "error": "Unauthorized" }));
            return;
        }
        next.call(ctx);
    });

    let router = Router::new();
    router
        .get("/secret", recording_handler(&trace), &[guard])
        .unwrap();
    let dispatcher = Dispatcher::new(Arc::new(router));

    let denied = dispatcher.dispatch(Request::get("/secret"));
    assert_eq!(denied.status, 401);
    assert!(trace.lock().is_empty());

    let allowed =
        dispatcher.dispatch(Request::get("/secret").with_header("Authorization", "Bearer t"));
    assert_eq!(allowed.status, 200);
    assert_eq!(*trace.lock(), vec!["handler"]);
}

#[test]
fn test_middleware_sees_response_on_way_out() {
    let stamp = middleware(|ctx: &mut RequestContext, next: &dyn Handler| {
        next.call(ctx);
        let status = ctx.response().status;
        ctx.set_header("x-seen-status", status.to_string());
    });

    let router = Router::new();
    router
        .get(
            "/created",
            |ctx: &mut RequestContext| ctx.string(201, "made"),
            &[stamp],
        )
        .unwrap();
    let dispatcher = Dispatcher::new(Arc::new(router));

    let response = dispatcher.dispatch(Request::get("/created"));
    assert_eq!(response.status, 201);
    assert_eq!(response.header("x-seen-status"), Some("201"));
}

#[test]
fn test_first_write_wins() {
    let overwrite = middleware(|ctx: &mut RequestContext, next: &dyn Handler| {
        next.call(ctx);
        ctx.string(500, "too late");
    });
    let router = Router::new();
    router
        .get(
            "/once",
            |ctx: &mut RequestContext| ctx.string(200, "first"),
            &[overwrite],
        )
        .unwrap();
    let dispatcher = Dispatcher::new(Arc::new(router));

    let response = dispatcher.dispatch(Request::get("/once"));
    assert_eq!(response.status, 200);
    assert_eq!(response.body_text(), "first");
}

#[test]
fn test_metrics_counts_by_class() {
    let metrics = Arc::new(MetricsMiddleware::new());
    let router = Router::new();
    router
        .get(
            "/s/:code",
            |ctx: &mut RequestContext| {
                let code = ctx.param("code").and_then(|c| c.parse().ok()).unwrap_or(200);
                ctx.string(code, "");
            },
            &[],
        )
        .unwrap();

    let mut dispatcher = Dispatcher::new(Arc::new(router));
    let mw: BoxedMiddleware = Arc::clone(&metrics) as BoxedMiddleware;
    dispatcher.use_middleware(mw);

    for code in ["200", "204", "302", "404", "503"] {
        dispatcher.dispatch(Request::get(&format!("/s/{code}")));
    }
    // Unmatched paths never reach the chain.
    dispatcher.dispatch(Request::get("/unrouted"));

    let snap = metrics.snapshot();
    assert_eq!(snap.requests, 5);
    assert_eq!(snap.in_flight, 0);
    assert_eq!(snap.status_2xx, 2);
    assert_eq!(snap.status_3xx, 1);
    assert_eq!(snap.status_4xx, 1);
    assert_eq!(snap.status_5xx, 1);
}

#[test]
fn test_request_logger_passes_through() {
    let router = Router::new();
    router
        .get(
            "/logged",
            |ctx: &mut RequestContext| ctx.string(200, "ok"),
            &[middleware(RequestLogger)],
        )
        .unwrap();
    let dispatcher = Dispatcher::new(Arc::new(router));
    let response = dispatcher.dispatch(Request::get("/logged"));
    assert_eq!(response.status, 200);
    assert_eq!(response.body_text(), "ok");
}

#[test]
fn test_panic_in_middleware_is_recovered() {
    let faulty = middleware(|_ctx: &mut RequestContext, _next: &dyn Handler| {
        panic!("middleware failure");
    });
    let router = Router::new();
    router
        .get("/m", |ctx: &mut RequestContext| ctx.string(200, "ok"), &[faulty])
        .unwrap();
    let dispatcher = Dispatcher::new(Arc::new(router));

    let response = dispatcher.dispatch(Request::get("/m"));
    assert_eq!(response.status, 500);
    assert_eq!(dispatcher.pool().stats().in_use, 0);
}

#[test]
fn test_clear_middleware_removes_recovery() {
    let router = Router::new();
    router
        .get("/boom", |_ctx: &mut RequestContext| panic!("unrecovered"), &[])
        .unwrap();
    let mut dispatcher = Dispatcher::new(Arc::new(router));
    dispatcher.clear_middleware();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        dispatcher.dispatch(Request::get("/boom"))
    }));
    assert!(result.is_err());
    // The guard still released the context during unwinding.
    assert_eq!(dispatcher.pool().stats().in_use, 0);
}
