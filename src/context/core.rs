use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, warn};

use super::error::BindError;
use super::request::Request;
use super::response::{ContentType, Response};
use crate::ids::RequestId;
use crate::router::ParamVec;

type StoreValue = Box<dyn Any + Send + Sync>;

/// Per-request state handed to handlers and middleware
///
/// Contexts are recycled through the [`ContextPool`](crate::context_pool::ContextPool):
/// [`prepare`](Self::prepare) fills one for a matched request and
/// [`reset`](Self::reset) clears it before it goes back to the pool. Nothing
/// from one request survives a reset.
///
/// The response is committed by the first emitter call (`json`, `xml`,
/// `string`, `html`). Later emitter calls are ignored with a warning;
/// middleware that needs to amend the committed response uses
/// [`response_mut`](Self::response_mut).
#[derive(Default)]
pub struct RequestContext {
    request: Option<Request>,
    params: ParamVec,
    store: HashMap<String, StoreValue>,
    matched_pattern: Option<Arc<str>>,
    matched_method: Option<Method>,
    request_id: Option<RequestId>,
    response: Response,
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("request", &self.request)
            .field("params", &self.params)
            .field("store_keys", &self.store.keys().collect::<Vec<_>>())
            .field("matched_pattern", &self.matched_pattern)
            .field("matched_method", &self.matched_method)
            .field("request_id", &self.request_id)
            .field("response", &self.response)
            .finish()
    }
}

impl RequestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a matched request to this context.
    pub fn prepare(
        &mut self,
        request: Request,
        params: ParamVec,
        pattern: Arc<str>,
        method: Method,
        request_id: RequestId,
    ) {
        self.reset();
        self.request = Some(request);
        self.params = params;
        self.matched_pattern = Some(pattern);
        self.matched_method = Some(method);
        self.request_id = Some(request_id);
    }

    /// Drop everything tied to the current request.
    ///
    /// Store capacity is kept; entries are dropped.
    pub fn reset(&mut self) {
        self.request = None;
        self.params.clear();
        self.store.clear();
        self.matched_pattern = None;
        self.matched_method = None;
        self.request_id = None;
        self.response.reset();
    }

    /// True when no request is bound
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.request.is_none()
            && self.params.is_empty()
            && self.store.is_empty()
            && self.matched_pattern.is_none()
            && !self.response.is_written()
    }

    // ---- request access -------------------------------------------------

    /// The bound request, if any
    #[must_use]
    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    #[must_use]
    pub fn method(&self) -> Option<&Method> {
        self.request.as_ref().map(|r| &r.method)
    }

    #[must_use]
    pub fn path(&self) -> &str {
        self.request.as_ref().map_or("", |r| r.path.as_str())
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.as_ref()?.header(name)
    }

    /// Whether the client asked to upgrade to a WebSocket
    #[must_use]
    pub fn is_websocket(&self) -> bool {
        self.request.as_ref().is_some_and(Request::is_websocket)
    }

    /// Whether the transport terminated TLS for this request
    #[must_use]
    pub fn is_tls(&self) -> bool {
        self.request.as_ref().is_some_and(|r| r.tls)
    }

    /// Client IP from `X-Forwarded-For` (first entry) or `X-Real-IP`
    #[must_use]
    pub fn real_ip(&self) -> Option<&str> {
        self.request.as_ref()?.real_ip()
    }

    #[must_use]
    pub fn query(&self, name: &str) -> Option<String> {
        self.request.as_ref()?.query_param(name)
    }

    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.request.as_ref()?.cookie(name)
    }

    #[must_use]
    pub fn cookies(&self) -> Vec<(String, String)> {
        self.request
            .as_ref()
            .map(Request::cookies)
            .unwrap_or_default()
    }

    /// Bound path parameter
    ///
    /// Last write wins when a name repeats along the matched route.
    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rev()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn params(&self) -> &ParamVec {
        &self.params
    }

    #[must_use]
    pub fn matched_pattern(&self) -> Option<&str> {
        self.matched_pattern.as_deref()
    }

    #[must_use]
    pub fn matched_method(&self) -> Option<&Method> {
        self.matched_method.as_ref()
    }

    #[must_use]
    pub fn request_id(&self) -> Option<RequestId> {
        self.request_id
    }

    /// Deserialize the JSON body into `T`.
    ///
    /// # Errors
    ///
    /// [`BindError::EmptyBody`] when there is no body, [`BindError::Json`]
    /// when it does not deserialize.
    pub fn bind<T: DeserializeOwned>(&self) -> Result<T, BindError> {
        let body = self
            .request
            .as_ref()
            .map(|r| r.body.as_slice())
            .unwrap_or_default();
        if body.is_empty() {
            return Err(BindError::EmptyBody);
        }
        Ok(serde_json::from_slice(body)?)
    }

    // ---- store ----------------------------------------------------------

    /// Attach a value for later middleware or the handler.
    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.store.insert(key.into(), Box::new(value));
    }

    /// Stored value under `key`, if present and of type `T`
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.store.get(key)?.downcast_ref::<T>()
    }

    pub fn remove<T: Any + Send + Sync>(&mut self, key: &str) -> Option<T> {
        let value = self.store.remove(key)?;
        value.downcast::<T>().ok().map(|b| *b)
    }

    // ---- response -------------------------------------------------------

    #[must_use]
    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    pub(crate) fn take_response(&mut self) -> Response {
        self.response.take()
    }

    /// Add or replace a response header.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.response.set_header(name, value.into());
    }

    fn emit(&mut self, status: u16, content_type: ContentType, body: Vec<u8>) {
        if self.response.is_written() {
            warn!(
                path = %self.path(),
                status = self.response.status,
                ignored_status = status,
                "Response already written, ignoring second write"
            );
            return;
        }
        self.response.commit(status, content_type, body);
    }

    /// Serialize `value` as the JSON response body.
    ///
    /// A value that fails to serialize produces a plain-text 500 instead.
    pub fn json<T: Serialize + ?Sized>(&mut self, status: u16, value: &T) {
        match serde_json::to_vec(value) {
            Ok(body) => self.emit(status, ContentType::Json, body),
            Err(e) => {
                error!(
                    path = %self.path(),
                    error = %e,
                    "Failed to serialize JSON response"
                );
                self.emit(
                    500,
                    ContentType::Text,
                    b"Internal Server Error".to_vec(),
                );
            }
        }
    }

    /// Write a pre-serialized XML document.
    pub fn xml(&mut self, status: u16, document: impl Into<String>) {
        self.emit(status, ContentType::Xml, document.into().into_bytes());
    }

    pub fn string(&mut self, status: u16, text: impl Into<String>) {
        self.emit(status, ContentType::Text, text.into().into_bytes());
    }

    pub fn html(&mut self, status: u16, markup: impl Into<String>) {
        self.emit(status, ContentType::Html, markup.into().into_bytes());
    }
}
