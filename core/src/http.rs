//! HTTP transport types shared by the builder, the requester and transports.
//!
//! # Design
//! A prepared request is plain data: method, URI, headers and a fully
//! buffered body. Transports turn it into network I/O and hand back an
//! `HttpResponse` whose body is still a readable stream, so the requester
//! decides whether the body is worth reading at all.

use std::fmt;
use std::io::Read;

use http::{HeaderMap, HeaderName, Method, Uri};

/// Tracing header set on every built request, even when the ID is empty.
pub const TRANSACTION_ID_HEADER: HeaderName = HeaderName::from_static("transaction-id");

/// Second tracing header, set only when the transaction ID is non-empty.
pub const X_TRANSACTION_ID_HEADER: HeaderName = HeaderName::from_static("x-transaction-id");

/// A fully assembled outbound request.
///
/// Produced by the `RequestBuilder::build_*` methods and consumed by a
/// `Transport`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// A response as returned by a `Transport`.
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Box<dyn Read>,
}

impl HttpResponse {
    /// Response with an in-memory body.
    pub fn from_bytes(status: u16, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: Box::new(std::io::Cursor::new(body.into())),
        }
    }

    /// True when `Content-Encoding` is exactly `gzip`.
    pub fn is_gzip(&self) -> bool {
        self.headers
            .get(http::header::CONTENT_ENCODING)
            .is_some_and(|v| v.as_bytes() == b"gzip")
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}
