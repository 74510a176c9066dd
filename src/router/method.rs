//! Fixed-size, method-indexed handler table.
//!
//! A route node only ever holds handlers for the eight verbs the registration
//! API exposes, so the table is an array indexed by method instead of a map.

use http::Method;

use super::error::RouterError;

/// Methods accepted at registration, in table order.
pub const SUPPORTED_METHODS: [Method; 8] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
    Method::TRACE,
];

#[inline]
pub(crate) fn slot(method: &Method) -> Option<usize> {
    match method.as_str() {
        "GET" => Some(0),
        "POST" => Some(1),
        "PUT" => Some(2),
        "PATCH" => Some(3),
        "DELETE" => Some(4),
        "HEAD" => Some(5),
        "OPTIONS" => Some(6),
        "TRACE" => Some(7),
        _ => None,
    }
}

/// Whether `method` is one of the eight routable verbs
#[inline]
#[must_use]
pub fn is_supported(method: &Method) -> bool {
    slot(method).is_some()
}

/// Per-node handler storage keyed by HTTP method
#[derive(Debug, Clone)]
pub struct MethodTable<T> {
    slots: [Option<T>; 8],
}

impl<T> Default for MethodTable<T> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }
}

impl<T> MethodTable<T> {
    /// Store `value` under `method`, returning the value it replaced.
    ///
    /// # Errors
    ///
    /// [`RouterError::UnsupportedMethod`] for methods outside the eight verbs.
    pub fn insert(&mut self, method: &Method, value: T) -> Result<Option<T>, RouterError> {
        let idx = slot(method).ok_or_else(|| RouterError::UnsupportedMethod {
            method: method.to_string(),
        })?;
        Ok(self.slots[idx].replace(value))
    }

    /// Look up the entry for `method`. Unsupported methods simply miss.
    #[inline]
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&T> {
        slot(method).and_then(|idx| self.slots[idx].as_ref())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Registered methods in table order
    pub fn allowed(&self) -> impl Iterator<Item = &Method> + '_ {
        SUPPORTED_METHODS
            .iter()
            .zip(self.slots.iter())
            .filter_map(|(m, s)| s.as_ref().map(|_| m))
    }

    /// Registered entries in table order
    pub fn iter(&self) -> impl Iterator<Item = (&Method, &T)> + '_ {
        SUPPORTED_METHODS
            .iter()
            .zip(self.slots.iter())
            .filter_map(|(m, s)| s.as_ref().map(|v| (m, v)))
    }

    /// Value for an `Allow` header, e.g. `GET, POST`
    #[must_use]
    pub fn allow_header(&self) -> String {
        let mut out = String::new();
        for m in self.allowed() {
            if !out.is_empty() {
                out.push_str(", ");
            }
            out.push_str(m.as_str());
        }
        out
    }
}
