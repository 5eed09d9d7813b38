//! Request handlers and filters.
//!
//! Both are continuation based: they receive the request plus a callback and
//! return whatever pollable they need to wait on, so a handler that reads
//! files or a filter that consults an access list never blocks the reactor.

use std::fmt;
use std::io;
use std::rc::Rc;

use crate::access::HtAccessError;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::reactor::{Callback, Next};

pub mod file_server;
pub mod htaccess_filter;

pub use file_server::FileServingHandler;
pub use htaccess_filter::HtAccessFilter;

/// Turns a request into a response.
pub trait AsyncRequestHandler {
    fn handle(&self, request: Request, callback: Callback<Response>) -> Next;
}

/// Why a filter could not reach a decision.
#[derive(Debug)]
pub enum FilterError {
    /// The access list exists but could not be read.
    Io(io::Error),
    /// The access list could not be parsed or resolved.
    HtAccess(HtAccessError),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::Io(err) => write!(f, "reading access list failed: {err}"),
            FilterError::HtAccess(err) => write!(f, "invalid access list: {err}"),
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FilterError::Io(err) => Some(err),
            FilterError::HtAccess(err) => Some(err),
        }
    }
}

/// Decides whether a request may reach the handler.
pub trait AsyncRequestFilter {
    fn allow(&self, request: &Request, callback: Callback<Result<bool, FilterError>>) -> Next;
}

/// Runs `filter` first. Rejected requests get 403, requests the filter could
/// not decide on get 500.
pub struct FilterMiddleware {
    filter: Rc<dyn AsyncRequestFilter>,
    handler: Rc<dyn AsyncRequestHandler>,
}

impl FilterMiddleware {
    pub fn new(filter: Rc<dyn AsyncRequestFilter>, handler: Rc<dyn AsyncRequestHandler>) -> Self {
        Self { filter, handler }
    }
}

impl AsyncRequestHandler for FilterMiddleware {
    fn handle(&self, request: Request, callback: Callback<Response>) -> Next {
        let handler = self.handler.clone();
        let checked = request.clone();
        self.filter.allow(
            &checked,
            Box::new(move |verdict| match verdict {
                Ok(true) => handler.handle(request, callback),
                Ok(false) => {
                    tracing::debug!(uri = %request.uri, remote = %request.remote_addr, "Request denied by filter");
                    callback(Response::forbidden())
                }
                Err(err) => {
                    tracing::warn!(uri = %request.uri, error = %err, "Filter failed");
                    callback(Response::internal_error())
                }
            }),
        )
    }
}

/// Answers every request with the same response.
#[derive(Debug, Clone)]
pub struct StaticResponseHandler {
    response: Response,
}

impl StaticResponseHandler {
    pub fn new(response: Response) -> Self {
        Self { response }
    }
}

impl AsyncRequestHandler for StaticResponseHandler {
    fn handle(&self, _request: Request, callback: Callback<Response>) -> Next {
        callback(self.response.clone())
    }
}
