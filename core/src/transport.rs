//! Network I/O behind a small trait.
//!
//! # Design
//! The requester never talks to the network directly. It hands a prepared
//! `HttpRequest` to a `Transport` and gets an `HttpResponse` back. Tests plug
//! in doubles; `UreqTransport` is the blocking default.

use tracing::debug;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes a prepared request.
///
/// Non-2xx statuses are responses, not errors: only failures that prevent a
/// response from being received (DNS, refused connection, broken stream)
/// should be returned as `Err`.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a `ureq::Agent`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .allow_non_standard_methods(true)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Use a caller-configured agent.
    ///
    /// The agent should be built with `http_status_as_error(false)`, otherwise
    /// 4xx/5xx responses turn into transport errors, and with
    /// `allow_non_standard_methods(true)`, otherwise methods such as `PURGE`
    /// are refused before any I/O.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!(method = %request.method, uri = %request.uri, "dispatching request");

        let mut builder = ::http::Request::builder()
            .method(request.method)
            .uri(request.uri);
        if let Some(headers) = builder.headers_mut() {
            *headers = request.headers;
        }

        let response = if request.body.is_empty() {
            self.agent.run(builder.body(())?)?
        } else {
            self.agent.run(builder.body(request.body)?)?
        };

        let (parts, body) = response.into_parts();
        Ok(HttpResponse {
            status: parts.status.as_u16(),
            headers: parts.headers,
            body: Box::new(body.into_reader()),
        })
    }
}
