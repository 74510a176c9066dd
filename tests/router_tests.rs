//! Integration tests for route registration and matching through `Router`
//!
//! Covers the public registration API (verbs, groups, normalization), the
//! precedence rules seen from outside the trie, and copy-on-write snapshots.

use std::sync::Arc;

use burrow::context::RequestContext;
use burrow::router::{Router, RouterError};
use http::Method;

fn noop(_ctx: &mut RequestContext) {}

fn pattern_for(router: &Router, method: &Method, path: &str) -> Option<String> {
    let trie = router.snapshot();
    let m = trie.find(path)?;
    m.endpoint(method).map(|e| e.pattern.to_string())
}

#[test]
fn test_every_verb_registers() {
    let router = Router::new();
    router.get("/r", noop, &[]).unwrap();
    router.post("/r", noop, &[]).unwrap();
    router.put("/r", noop, &[]).unwrap();
    router.patch("/r", noop, &[]).unwrap();
    router.delete("/r", noop, &[]).unwrap();
    router.head("/r", noop, &[]).unwrap();
    router.options("/r", noop, &[]).unwrap();
    router.trace("/r", noop, &[]).unwrap();

    assert_eq!(router.len(), 8);
    let trie = router.snapshot();
    let m = trie.find("/r").unwrap();
    assert_eq!(
        m.node.handlers().allow_header(),
        "GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS, TRACE"
    );
}

#[test]
fn test_unsupported_method() {
    let router = Router::new();
    let err = router
        .add(Method::CONNECT, "/tunnel", noop, &[])
        .unwrap_err();
    assert!(matches!(err, RouterError::UnsupportedMethod { .. }));
    assert!(router.is_empty());
}

#[test]
fn test_pattern_normalization() {
    let router = Router::new();
    router.get("", noop, &[]).unwrap();
    router.get("health", noop, &[]).unwrap();
    assert_eq!(pattern_for(&router, &Method::GET, "/").as_deref(), Some("/"));
    assert_eq!(
        pattern_for(&router, &Method::GET, "/health").as_deref(),
        Some("/health")
    );
}

#[test]
fn test_static_precedence_over_param() {
    let router = Router::new();
    router.get("/user/delete", noop, &[]).unwrap();
    router.post("/user/:action", noop, &[]).unwrap();

    assert_eq!(
        pattern_for(&router, &Method::GET, "/user/delete").as_deref(),
        Some("/user/delete")
    );
    assert_eq!(
        pattern_for(&router, &Method::POST, "/user/promote").as_deref(),
        Some("/user/:action")
    );
}

#[test]
fn test_group_prefix_and_nesting() {
    let router = Router::new();
    let api = router.group("/api");
    api.get("/users", noop, &[]).unwrap();
    let v1 = api.group("v1/");
    v1.get("/items/:id", noop, &[]).unwrap();
    assert_eq!(v1.prefix(), "/api/v1/");

    let routes: Vec<String> = router
        .routes()
        .into_iter()
        .map(|(m, p)| format!("{m} {p}"))
        .collect();
    assert_eq!(routes, vec!["GET /api/users", "GET /api/v1/items/:id"]);
}

#[test]
fn test_group_root_route() {
    let router = Router::new();
    let admin = router.group("/admin");
    admin.get("", noop, &[]).unwrap();
    assert_eq!(
        pattern_for(&router, &Method::GET, "/admin").as_deref(),
        Some("/admin")
    );
}

#[test]
fn test_malformed_pattern_fails_fast() {
    let router = Router::new();
    router.get("/ok", noop, &[]).unwrap();
    let before = router.snapshot();

    let err = router.get("/a/*rest/b", noop, &[]).unwrap_err();
    assert!(matches!(err, RouterError::MalformedPattern { .. }));

    // Nothing new was published.
    assert!(Arc::ptr_eq(&before, &router.snapshot()));
    assert_eq!(router.len(), 1);
}

#[test]
fn test_param_name_conflict_leaves_table_untouched() {
    let router = Router::new();
    router.get("/users/:id", noop, &[]).unwrap();
    let err = router
        .get("/users/:user_id/posts", noop, &[])
        .unwrap_err();
    assert!(matches!(err, RouterError::ParamNameConflict { .. }));
    assert!(err.to_string().contains("user_id"));
    assert_eq!(router.len(), 1);
    assert!(router.snapshot().find("/users/1/posts").is_none());
}

#[test]
fn test_snapshots_are_immutable() {
    let router = Router::new();
    router.get("/a", noop, &[]).unwrap();
    let old = router.snapshot();

    router.get("/b", noop, &[]).unwrap();
    let new = router.snapshot();

    assert!(old.find("/b").is_none());
    assert!(new.find("/b").is_some());
    assert_eq!(old.len(), 1);
    assert_eq!(new.len(), 2);
}

#[test]
fn test_concurrent_registration_is_not_lost() {
    let router = Arc::new(Router::new());
    let threads: Vec<_> = (0..8)
        .map(|t| {
            let router = Arc::clone(&router);
            std::thread::spawn(move || {
                for i in 0..25 {
                    router.get(&format!("/t{t}/r{i}"), noop, &[]).unwrap();
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }
    assert_eq!(router.len(), 200);
    assert!(router.snapshot().find("/t7/r24").is_some());
}

#[test]
fn test_lookup_during_registration() {
    let router = Arc::new(Router::new());
    router.get("/stable/:id", noop, &[]).unwrap();

    let reader = {
        let router = Arc::clone(&router);
        std::thread::spawn(move || {
            for i in 0..500 {
                let trie = router.snapshot();
                let m = trie.find(&format!("/stable/{i}")).unwrap();
                assert_eq!(m.param("id"), Some(i.to_string().as_str()));
            }
        })
    };
    for i in 0..100 {
        router.get(&format!("/extra/{i}"), noop, &[]).unwrap();
    }
    reader.join().unwrap();
}

#[test]
fn test_batch_publishes_once() {
    let router = Router::new();
    router.get("/existing", noop, &[]).unwrap();
    let before = router.snapshot();

    router
        .batch(|b| {
            for i in 0..50 {
                b.get(&format!("/bulk/{i}"), noop, &[])?;
            }
            b.post("/bulk/:id", noop, &[])?;
            assert_eq!(b.added(), 51);
            Ok(())
        })
        .unwrap();

    assert_eq!(router.len(), 52);
    assert!(before.find("/bulk/0").is_none());
    assert_eq!(
        pattern_for(&router, &Method::POST, "/bulk/999").as_deref(),
        Some("/bulk/:id")
    );
}

#[test]
fn test_failed_batch_publishes_nothing() {
    let router = Router::new();
    router.get("/existing", noop, &[]).unwrap();
    let before = router.snapshot();

    let err = router
        .batch(|b| {
            b.get("/staged", noop, &[])?;
            b.get("/bad/*rest/tail", noop, &[])
        })
        .unwrap_err();
    assert!(matches!(err, RouterError::MalformedPattern { .. }));

    assert!(Arc::ptr_eq(&before, &router.snapshot()));
    assert!(router.snapshot().find("/staged").is_none());
    assert_eq!(router.len(), 1);
}
