use http::StatusCode;
use tracing::warn;

use crate::context::{ContentType, Response};

/// Header slots `may_minihttp` keeps per response.
const MAX_WIRE_HEADERS: usize = 16;

/// Headers the transport writes itself.
const TRANSPORT_HEADERS: [&str; 4] = ["content-length", "date", "server", "transfer-encoding"];

/// Per-connection storage for formatted header lines
///
/// The transport only accepts `&'static str` header lines and encodes them
/// after [`HttpService::call`](may_minihttp::HttpService::call) returns. Lines
/// are owned here and handed out for the duration of one response; the next
/// call on the same connection clears them.
#[derive(Debug, Default)]
pub struct HeaderLines {
    lines: Vec<Box<str>>,
}

impl Clone for HeaderLines {
    /// Each connection starts with empty storage.
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl HeaderLines {
    /// Drop the lines of the previous response.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[allow(unsafe_code)]
    fn push(&mut self, name: &str, value: &str) -> &'static str {
        let line: Box<str> = format!("{name}: {value}").into_boxed_str();
        let ptr: *const str = &*line;
        self.lines.push(line);
        // SAFETY: the boxed str has a stable heap address that outlives the
        // response. `may_minihttp` encodes the response right after `call`
        // returns and before the connection loop calls the service again;
        // lines are only dropped by `clear` at the start of that next call
        // or when the per-connection service is dropped.
        unsafe { &*ptr }
    }
}

fn status_reason(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

fn is_valid_header(name: &str, value: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_graphic() && b != b':')
        && !value.bytes().any(|b| b == b'\r' || b == b'\n')
}

/// Write a router [`Response`] onto the wire.
///
/// `Content-Type` comes from the response content type; every other header
/// in [`Response::headers`] is written as-is. Headers the transport sets
/// itself, values containing line breaks, and headers beyond the
/// transport's slot count are dropped with a warning.
pub fn write_response(
    res: &mut may_minihttp::Response,
    response: Response,
    lines: &mut HeaderLines,
) {
    res.status_code(response.status as usize, status_reason(response.status));

    let mut used = 0;
    if let Some(ct) = response.content_type {
        res.header(ct.header_line());
        used += 1;
    }

    for (name, value) in &response.headers {
        if TRANSPORT_HEADERS
            .iter()
            .any(|h| name.eq_ignore_ascii_case(h))
            || (response.content_type.is_some() && name.eq_ignore_ascii_case("content-type"))
        {
            continue;
        }
        if !is_valid_header(name, value) {
            warn!(header = %name, "Dropping malformed response header");
            continue;
        }
        if used == MAX_WIRE_HEADERS {
            warn!(
                header = %name,
                limit = MAX_WIRE_HEADERS,
                "Response header limit reached, dropping header"
            );
            continue;
        }
        res.header(lines.push(name, value));
        used += 1;
    }

    res.body_vec(response.body);
}

/// Write a JSON error `{"error": message}`.
pub fn write_json_error(res: &mut may_minihttp::Response, status: u16, message: &str) {
    res.status_code(status as usize, status_reason(status));
    res.header(ContentType::Json.header_line());
    res.body_vec(
        serde_json::json!({ "error": message })
            .to_string()
            .into_bytes(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(404), "Not Found");
        assert_eq!(status_reason(405), "Method Not Allowed");
        assert_eq!(status_reason(599), "Unknown");
    }

    #[test]
    fn test_header_lines_format_and_clear() {
        let mut lines = HeaderLines::default();
        let allow = lines.push("allow", "GET, POST");
        let location = lines.push("location", "/elsewhere");
        assert_eq!(allow, "allow: GET, POST");
        assert_eq!(location, "location: /elsewhere");
        assert_eq!(lines.len(), 2);

        lines.clear();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_header_lines_clone_is_empty() {
        let mut lines = HeaderLines::default();
        lines.push("x-a", "1");
        assert!(lines.clone().is_empty());
    }

    #[test]
    fn test_header_validation() {
        assert!(is_valid_header("x-custom", "yes"));
        assert!(is_valid_header("set-cookie", "a=b; Path=/"));
        assert!(!is_valid_header("x-bad", "a\r\nx-injected: 1"));
        assert!(!is_valid_header("bad name", "v"));
        assert!(!is_valid_header("", "v"));
    }
}
