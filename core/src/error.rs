//! Error types for request construction and dispatch.
//!
//! # Design
//! Failures are split by phase. `BuildError` covers everything that can go
//! wrong while assembling a request; it is captured inside the `Requester`
//! and only surfaces when the request is sent, wrapped in
//! `RequestError::Build`. Every `RequestError` knows the status code that
//! accompanies it, so callers get the `(status, error)` pair from one value.

use std::io;

use thiserror::Error;

/// Boxed error produced by a `Transport` implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors captured while building a request.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The JSON payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A named upload field was missing or could not be read.
    #[error("cannot read form file {field:?}: {source}")]
    FileAccess {
        field: String,
        #[source]
        source: io::Error,
    },

    /// The multipart body could not be written or finalized.
    #[error("multipart encoding failed: {0}")]
    Encoding(#[source] io::Error),

    /// Method, URI or a header was rejected by the HTTP request builder.
    #[error("invalid request: {0}")]
    RequestConstruction(#[from] http::Error),
}

/// Errors returned by `Requester::send`.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request was never built; the build error is reported as unknown.
    #[error("unknown error: {0}")]
    Build(#[source] BuildError),

    /// The transport failed before a response was received.
    #[error("error encountered when making request: {0}")]
    Transport(#[source] TransportError),

    /// A gzip-encoded response body could not be decompressed.
    #[error("unable to decompress gzip encoded content: {0}")]
    Decoding(#[source] io::Error),

    /// The response body could not be parsed into the response target.
    #[error("unable to unmarshal response object to provided model: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The service answered with a status other than 200.
    #[error("non-200 status code returned from service call: {0}")]
    NonSuccessStatus(u16),
}

impl RequestError {
    /// Status code reported alongside this error.
    pub fn status(&self) -> u16 {
        match self {
            RequestError::NonSuccessStatus(status) => *status,
            _ => 500,
        }
    }
}

impl From<BuildError> for RequestError {
    fn from(err: BuildError) -> Self {
        RequestError::Build(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn non_success_keeps_its_status() {
        assert_eq!(RequestError::NonSuccessStatus(404).status(), 404);
        assert_eq!(RequestError::NonSuccessStatus(503).status(), 503);
    }

    #[test]
    fn every_other_error_reports_500() {
        let build = RequestError::from(BuildError::Encoding(io::Error::other("closed")));
        assert_eq!(build.status(), 500);
        let transport = RequestError::Transport("connection refused".into());
        assert_eq!(transport.status(), 500);
        let decoding = RequestError::Decoding(io::Error::new(io::ErrorKind::InvalidData, "bad header"));
        assert_eq!(decoding.status(), 500);
    }

    #[test]
    fn build_error_is_reported_as_unknown_with_source() {
        let err = RequestError::from(BuildError::FileAccess {
            field: "avatar".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        });
        assert!(err.to_string().starts_with("unknown error: "));
        assert!(err.to_string().contains("avatar"));
        assert!(err.source().is_some());
    }
}
