//! # Server Module
//!
//! Transport adapter: runs the [`Dispatcher`](crate::dispatcher::Dispatcher)
//! behind `may_minihttp`. The router core never touches sockets; this module
//! converts wire requests into [`Request`](crate::context::Request)s and
//! router responses back onto the wire.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use burrow::{dispatcher::Dispatcher, router::Router};
//! use burrow::server::{AppService, HttpServer};
//!
//! let router = Arc::new(Router::new());
//! let dispatcher = Arc::new(Dispatcher::new(router));
//! let handle = HttpServer(AppService::new(dispatcher)).start("127.0.0.1:8080")?;
//! handle.wait_ready()?;
//! handle.join().ok();
//! ```

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_request, ParseError};
pub use response::{write_json_error, write_response, HeaderLines};
pub use service::AppService;
