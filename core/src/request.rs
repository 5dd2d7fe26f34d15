//! Sending a prepared request and decoding its response.
//!
//! # Design
//! `Requester::send_with` runs a fixed pipeline:
//!
//! 1. a build error short-circuits before any I/O;
//! 2. the transport executes the request;
//! 3. with a response target registered, the whole body is buffered, gunzipped
//!    when `Content-Encoding: gzip`, and parsed as JSON into the target;
//! 4. any status other than 200 is an error, even after a successful decode.
//!
//! The body is buffered before parsing so the raw text can be logged when it
//! is not JSON.

use std::io::Read;

use flate2::read::MultiGzDecoder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, Level};

use crate::error::{BuildError, RequestError};
use crate::http::HttpRequest;
use crate::log::{EventLog, LogEvent, TracingLog};
use crate::transport::{Transport, UreqTransport};

/// Status code on success; on failure an error that knows its own status.
pub type Outcome = Result<u16, RequestError>;

/// A built request, ready to send.
#[derive(Debug)]
pub struct Requester<'a, T> {
    prepared: Result<HttpRequest, BuildError>,
    response: Option<&'a mut T>,
    transaction_id: String,
}

impl<'a, T> Requester<'a, T> {
    pub(crate) fn new(
        prepared: Result<HttpRequest, BuildError>,
        response: Option<&'a mut T>,
        transaction_id: String,
    ) -> Self {
        Self {
            prepared,
            response,
            transaction_id,
        }
    }

    /// The prepared request, or the error captured while building it.
    pub fn prepared(&self) -> Result<&HttpRequest, &BuildError> {
        self.prepared.as_ref()
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }
}

impl<T: DeserializeOwned> Requester<'_, T> {
    /// Send over a default `UreqTransport`, logging through `tracing`.
    pub fn send(self) -> Outcome {
        self.send_with(&UreqTransport::new(), &TracingLog)
    }

    pub fn send_with(self, transport: &dyn Transport, log: &dyn EventLog) -> Outcome {
        let request = self.prepared?;
        let mut response = transport
            .execute(request)
            .map_err(RequestError::Transport)?;

        if let Some(target) = self.response {
            let mut buf = Vec::new();
            if let Err(err) = response.body.read_to_end(&mut buf) {
                debug!(error = %err, read = buf.len(), "response body ended early");
            }

            if response.is_gzip() {
                buf = gunzip(&buf)?;
            }

            let mut de = serde_json::Deserializer::from_slice(&buf);
            match T::deserialize(&mut de) {
                Ok(value) => *target = value,
                Err(err) => {
                    log.log(LogEvent {
                        level: Level::ERROR,
                        message: "Service call returned non-json response body.".to_string(),
                        transaction: self.transaction_id,
                        error: err.to_string(),
                        body: String::from_utf8_lossy(&buf).into_owned(),
                    });
                    return Err(RequestError::Deserialization(err));
                }
            }
        }

        debug!(status = response.status, "service call completed");
        if response.status != 200 {
            return Err(RequestError::NonSuccessStatus(response.status));
        }
        Ok(response.status)
    }
}

/// Decompress a buffered gzip body, including every concatenated member.
///
/// An unreadable gzip header is an error. Once the header is accepted, a
/// failure later in the stream keeps whatever was decompressed so far.
fn gunzip(buf: &[u8]) -> Result<Vec<u8>, RequestError> {
    let mut decoder = MultiGzDecoder::new(buf);
    let mut out = Vec::new();
    if let Err(err) = decoder.read_to_end(&mut out) {
        if decoder.header().is_none() {
            return Err(RequestError::Decoding(err));
        }
        debug!(error = %err, decompressed = out.len(), "using partially decompressed body");
    }
    Ok(out)
}
