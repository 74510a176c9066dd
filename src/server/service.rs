use std::io;
use std::sync::Arc;

use may_minihttp::{HttpService, Request, Response};
use tracing::warn;

use super::request::parse_request;
use super::response::{write_json_error, write_response, HeaderLines};
use crate::dispatcher::Dispatcher;

/// `may_minihttp` service backed by a shared [`Dispatcher`]
///
/// Cloned once per connection; clones share the dispatcher, and with it
/// the route table and context pool. Header line storage is per clone.
#[derive(Clone)]
pub struct AppService {
    pub dispatcher: Arc<Dispatcher>,
    lines: HeaderLines,
}

impl AppService {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            lines: HeaderLines::default(),
        }
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        // The previous response on this connection has been encoded.
        self.lines.clear();

        let request = match parse_request(req) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Rejecting unparseable request");
                write_json_error(res, 400, "Bad Request");
                return Ok(());
            }
        };

        let response = self.dispatcher.dispatch(request);
        write_response(res, response, &mut self.lines);
        Ok(())
    }
}
