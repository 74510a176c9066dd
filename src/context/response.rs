use std::sync::Arc;

use super::request::HeaderVec;

/// Body encodings the emitters produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    Xml,
    Text,
    Html,
}

impl ContentType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::Xml => "application/xml; charset=utf-8",
            ContentType::Text => "text/plain; charset=utf-8",
            ContentType::Html => "text/html; charset=utf-8",
        }
    }

    /// Complete header line, for transports that only take `'static` headers
    #[must_use]
    pub fn header_line(self) -> &'static str {
        match self {
            ContentType::Json => "Content-Type: application/json",
            ContentType::Xml => "Content-Type: application/xml; charset=utf-8",
            ContentType::Text => "Content-Type: text/plain; charset=utf-8",
            ContentType::Html => "Content-Type: text/html; charset=utf-8",
        }
    }
}

/// Outbound response
///
/// Starts as an empty `200`. The first emitter call on the owning context
/// commits it; see [`RequestContext`](super::RequestContext).
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub content_type: Option<ContentType>,
    pub headers: HeaderVec,
    pub body: Vec<u8>,
    written: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 200,
            content_type: None,
            headers: HeaderVec::new(),
            body: Vec::new(),
            written: false,
        }
    }
}

impl Response {
    #[must_use]
    pub fn new(status: u16, content_type: ContentType, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: Some(content_type),
            headers: HeaderVec::new(),
            body,
            written: true,
        }
    }

    /// JSON response from an already-built value
    #[must_use]
    pub fn json_value(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, ContentType::Json, value.to_string().into_bytes())
    }

    /// JSON error body `{"error": message}`
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json_value(status, &serde_json::json!({ "error": message }))
    }

    /// Whether an emitter has committed this response
    #[must_use]
    pub fn is_written(&self) -> bool {
        self.written
    }

    pub(crate) fn commit(&mut self, status: u16, content_type: ContentType, body: Vec<u8>) {
        self.status = status;
        self.content_type = Some(content_type);
        self.body = body;
        self.written = true;
    }

    /// Back to an uncommitted, empty `200`, keeping buffer capacity.
    pub fn reset(&mut self) {
        self.status = 200;
        self.content_type = None;
        self.headers.clear();
        self.body.clear();
        self.written = false;
    }

    /// Move the response out, leaving a fresh one behind.
    #[must_use]
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header (case-insensitive name)
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    /// Body as UTF-8 text, lossily
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON, `Value::Null` when it is not JSON
    #[must_use]
    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or(serde_json::Value::Null)
    }
}
