//! Outbound request construction and response decoding.
//!
//! # Overview
//! `RequestBuilder` assembles an HTTP request in one of three encodings
//! (JSON, multipart form, raw octet-stream) and attaches the transaction
//! tracing headers. The resulting `Requester` sends it through a `Transport`
//! and decodes the response body, gunzipping it when needed, into a value the
//! caller owns.
//!
//! # Design
//! - Building never fails outright: a build error is kept inside the
//!   `Requester` and reported by `send` without touching the network.
//! - Every error carries the status code that goes with it
//!   (`RequestError::status`); only `Ok(200)` is full success.
//! - The network, the inbound upload form and the log sink are traits
//!   (`Transport`, `FileSource`, `EventLog`) so the pipeline is testable
//!   without I/O.

pub mod builder;
pub mod error;
pub mod http;
pub mod log;
pub mod multipart;
pub mod request;
pub mod transport;
pub mod upload;

pub use builder::RequestBuilder;
pub use error::{BuildError, RequestError, TransportError};
pub use crate::http::{HttpRequest, HttpResponse, TRANSACTION_ID_HEADER, X_TRANSACTION_ID_HEADER};
pub use log::{EventLog, LogEvent, RecordingLog, TracingLog};
pub use multipart::MultipartWriter;
pub use request::{Outcome, Requester};
pub use transport::{Transport, UreqTransport};
pub use upload::{FileSource, FormFile, FormFiles};
