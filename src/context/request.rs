use std::sync::Arc;

use http::Method;
use smallvec::SmallVec;

/// Maximum number of headers kept inline before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage. Names are lower-cased `Arc<str>`.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Inbound request as seen by the router
///
/// Transport-neutral: the server adapter builds one from the wire request,
/// tests build them directly.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Path without the query string
    pub path: String,
    /// Raw query string, without the leading `?`
    pub query: Option<String>,
    pub headers: HeaderVec,
    pub body: Vec<u8>,
    /// Set by a transport that terminated TLS for this request
    pub tls: bool,
}

impl Request {
    /// Build a request from a method and a request target (`/path?query`).
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p, Some(q.to_string())),
            None => (target, None),
        };
        Self {
            method,
            path: if path.is_empty() {
                "/".to_string()
            } else {
                path.to_string()
            },
            query,
            headers: HeaderVec::new(),
            body: Vec::new(),
            tls: false,
        }
    }

    #[must_use]
    pub fn get(target: &str) -> Self {
        Self::new(Method::GET, target)
    }

    #[must_use]
    pub fn post(target: &str) -> Self {
        Self::new(Method::POST, target)
    }

    /// Add a header; the name is stored lower-cased.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.push_header(name, value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    pub fn push_header(&mut self, name: &str, value: String) {
        self.headers
            .push((Arc::from(name.to_ascii_lowercase().as_str()), value));
    }

    /// Case-insensitive header lookup (first occurrence)
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// `Upgrade: websocket`, compared case-insensitively
    #[must_use]
    pub fn is_websocket(&self) -> bool {
        self.header("upgrade")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("websocket"))
    }

    /// Client address reported by a proxy
    ///
    /// The first non-empty `X-Forwarded-For` entry, else `X-Real-IP`. The
    /// router has no socket peer address, so `None` when neither is present.
    #[must_use]
    pub fn real_ip(&self) -> Option<&str> {
        self.header("x-forwarded-for")
            .and_then(|v| v.split(',').map(str::trim).find(|ip| !ip.is_empty()))
            .or_else(|| {
                self.header("x-real-ip")
                    .map(str::trim)
                    .filter(|ip| !ip.is_empty())
            })
    }

    /// URL-decoded query parameter (first occurrence)
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    /// All cookies from the `Cookie` header as `(name, value)` pairs
    #[must_use]
    pub fn cookies(&self) -> Vec<(String, String)> {
        self.header("cookie")
            .map(|c| {
                c.split(';')
                    .filter_map(|pair| {
                        let mut parts = pair.trim().splitn(2, '=');
                        let name = parts.next()?.trim();
                        if name.is_empty() {
                            return None;
                        }
                        let value = parts.next().unwrap_or("").trim();
                        Some((name.to_string(), value.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies()
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }
}
