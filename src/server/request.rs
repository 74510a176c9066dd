use std::io::Read;

use http::Method;
use tracing::debug;

use crate::context::Request;

/// Why a wire request could not be converted
#[derive(Debug)]
pub enum ParseError {
    InvalidMethod(String),
    Body(std::io::Error),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidMethod(m) => write!(f, "invalid HTTP method '{}'", m),
            ParseError::Body(e) => write!(f, "failed to read request body: {}", e),
        }
    }
}

impl std::error::Error for ParseError {}

/// Convert a `may_minihttp` request into a router [`Request`].
///
/// Header names are lower-cased, the query string is split off the path
/// and the body is read fully.
///
/// # Errors
///
/// [`ParseError::InvalidMethod`] for a method token `http` rejects,
/// [`ParseError::Body`] when the body cannot be read.
pub fn parse_request(req: may_minihttp::Request) -> Result<Request, ParseError> {
    let method = Method::from_bytes(req.method().as_bytes())
        .map_err(|_| ParseError::InvalidMethod(req.method().to_string()))?;

    let mut request = Request::new(method, req.path());
    for h in req.headers() {
        request.push_header(h.name, String::from_utf8_lossy(h.value).into_owned());
    }

    let mut body = Vec::new();
    req.body().read_to_end(&mut body).map_err(ParseError::Body)?;
    request.body = body;

    debug!(
        method = %request.method,
        path = %request.path,
        header_count = request.headers.len(),
        body_bytes = request.body.len(),
        "Request parsed"
    );
    Ok(request)
}
