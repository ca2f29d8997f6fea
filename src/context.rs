use crate::handler::Handlers;
use crate::params::Params;

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode};

/// The per-request context a handler chain executes against.
///
/// One logical request is processed start-to-finish by one execution context;
/// the router never suspends a chain. Hosting servers are expected to pool
/// contexts and [`reset`](Context::reset) them between requests.
#[derive(Debug)]
pub struct Context {
    pub method: Method,
    /// The request host, as sent by the client (may carry a `:port` suffix).
    /// Empty when the hosting server does not forward it.
    pub host: String,
    pub path: String,
    pub scheme: String,
    /// Parameters extracted by the route match, in declaration order.
    pub params: Params,
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    stopped: bool,
}

impl Context {
    pub fn new(method: Method, host: &str, path: &str) -> Context {
        Context {
            method,
            host: host.to_string(),
            path: path.to_string(),
            scheme: "http".to_string(),
            params: Params::new(),
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            stopped: false,
        }
    }

    /// Re-arms a pooled context for a new request.
    pub fn reset(&mut self, method: Method, host: &str, path: &str) {
        self.method = method;
        self.host.clear();
        self.host.push_str(host);
        self.path.clear();
        self.path.push_str(path);
        self.params.clear();
        self.status = StatusCode::OK;
        self.headers.clear();
        self.body.clear();
        self.stopped = false;
    }

    /// Signals that no further handlers in the current chain should run.
    pub fn stop_execution(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn status_code(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Appends text to the response body.
    pub fn write(&mut self, text: &str) {
        self.body.extend_from_slice(text.as_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Discards anything a partially executed chain already wrote. Used by
    /// error handlers so a recovered fault does not leak half a response.
    pub fn reset_body(&mut self) {
        self.body.clear();
    }

    /// Runs a built chain sequentially, in order, until completion or an
    /// explicit stop. Faults are not caught here; the dispatch boundary is
    /// the single recovery point.
    pub(crate) fn run(&mut self, handlers: &Handlers) {
        for handler in handlers {
            if self.stopped {
                break;
            }
            handler.call(self);
        }
    }
}
