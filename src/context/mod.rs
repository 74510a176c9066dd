//! # Request Context
//!
//! The capability set a handler receives: the bound [`Request`], path
//! parameters, a typed per-request store, and response emitters writing into
//! a [`Response`].

mod core;
mod error;
mod request;
mod response;

pub use core::RequestContext;
pub use error::BindError;
pub use request::{HeaderVec, Request, MAX_INLINE_HEADERS};
pub use response::{ContentType, Response};
