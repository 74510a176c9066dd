use serde_json::{json, Map, Value};

use crate::context::RequestContext;

/// Echo handler: replies with what the router resolved for the request.
///
/// Useful as a placeholder route and in tests.
pub fn echo_handler(ctx: &mut RequestContext) {
    let params: Map<String, Value> = ctx
        .params()
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
        .collect();
    let query = ctx
        .request()
        .and_then(|r| r.query.clone())
        .unwrap_or_default();
    let body = ctx
        .request()
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .unwrap_or_default();

    let payload = json!({
        "method": ctx.method().map(|m| m.as_str()).unwrap_or_default(),
        "path": ctx.path(),
        "pattern": ctx.matched_pattern(),
        "params": params,
        "query": query,
        "body": body,
        "request_id": ctx.request_id(),
    });
    ctx.json(200, &payload);
}
