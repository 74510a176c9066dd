use std::fmt;

/// Failure to bind a request body into a typed value
#[derive(Debug)]
pub enum BindError {
    /// The request carried no body
    EmptyBody,
    /// The body is not valid JSON for the target type
    Json(serde_json::Error),
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::EmptyBody => write!(f, "request body is empty"),
            BindError::Json(e) => write!(f, "invalid JSON body: {}", e),
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BindError::EmptyBody => None,
            BindError::Json(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for BindError {
    fn from(e: serde_json::Error) -> Self {
        BindError::Json(e)
    }
}
