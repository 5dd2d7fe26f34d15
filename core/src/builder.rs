//! Fluent request builder.
//!
//! # Design
//! `RequestBuilder` is a plain value: every setter consumes it and hands it
//! back, and each `build_*` method consumes it for good. A build never fails
//! outright. It returns a `Requester` holding either the prepared request or
//! the error captured while assembling it, so the error surfaces at `send`.
//!
//! All three encodings share one header policy, applied in order:
//! `Transaction-Id` is always set (possibly empty), caller headers are
//! appended without deduplication, the encoding's content type is applied,
//! and `X-Transaction-Id` is set when the transaction ID is non-empty.

use std::collections::HashMap;
use std::io;

use ::http::header::CONTENT_TYPE;
use ::http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use serde::Serialize;

use crate::error::BuildError;
use crate::http::{HttpRequest, TRANSACTION_ID_HEADER, X_TRANSACTION_ID_HEADER};
use crate::multipart::MultipartWriter;
use crate::request::Requester;
use crate::upload::FileSource;

/// How a build path declares the body's content type.
enum ContentType {
    /// Replaces any caller-supplied value.
    Fixed(&'static str),
    /// Declared by the encoder; a caller-supplied value takes precedence.
    Declared(String),
}

/// Accumulates request settings until one of the `build_*` methods runs.
///
/// `T` is the type the response body is decoded into; it is `()` until
/// `response` registers a target.
#[derive(Debug)]
pub struct RequestBuilder<'a, T = ()> {
    method: String,
    url: String,
    headers: HashMap<String, Vec<String>>,
    transaction_id: String,
    response: Option<&'a mut T>,
}

impl RequestBuilder<'static, ()> {
    pub fn new() -> Self {
        Self {
            method: String::new(),
            url: String::new(),
            headers: HashMap::new(),
            transaction_id: String::new(),
            response: None,
        }
    }
}

impl Default for RequestBuilder<'static, ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> RequestBuilder<'a, T> {
    /// Not validated here; an invalid method fails at build time.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Not validated here; an invalid URL fails at build time.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Replace the whole caller header map.
    pub fn headers(mut self, headers: HashMap<String, Vec<String>>) -> Self {
        self.headers = headers;
        self
    }

    pub fn transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = transaction_id.into();
        self
    }

    /// Register the value the response body is decoded into.
    ///
    /// Without a target the body is never read and only the status matters.
    pub fn response<'b, U>(self, target: &'b mut U) -> RequestBuilder<'b, U> {
        RequestBuilder {
            method: self.method,
            url: self.url,
            headers: self.headers,
            transaction_id: self.transaction_id,
            response: Some(target),
        }
    }

    /// Build a request with a JSON body.
    ///
    /// `None` sends an empty body. `Content-Type` is always
    /// `application/json`.
    pub fn build_json<P: Serialize + ?Sized>(self, payload: Option<&P>) -> Requester<'a, T> {
        let body = match payload {
            Some(payload) => serde_json::to_vec(payload).map_err(BuildError::Serialization),
            None => Ok(Vec::new()),
        };
        match body {
            Ok(body) => self.finish(body, ContentType::Fixed("application/json")),
            Err(err) => self.fail(err),
        }
    }

    /// Build a `multipart/form-data` request.
    ///
    /// `files` maps the outgoing part name to the form field the file is read
    /// from in `source`; that field name also becomes the part's filename.
    /// `fields` become plain form fields.
    pub fn build_multipart<S: FileSource + ?Sized>(
        self,
        source: &S,
        files: &HashMap<String, String>,
        fields: &HashMap<String, String>,
    ) -> Requester<'a, T> {
        match encode_multipart(source, files, fields) {
            Ok((body, content_type)) => self.finish(body, ContentType::Declared(content_type)),
            Err(err) => self.fail(err),
        }
    }

    /// Build a request whose body is the raw content of one uploaded file.
    ///
    /// `Content-Type` is `application/octet-stream` whatever the file was.
    pub fn build_octet<S: FileSource + ?Sized>(self, source: &S, field: &str) -> Requester<'a, T> {
        match read_file(source, field) {
            Ok(body) => self.finish(body, ContentType::Fixed("application/octet-stream")),
            Err(err) => self.fail(err),
        }
    }

    fn finish(self, body: Vec<u8>, content_type: ContentType) -> Requester<'a, T> {
        let prepared = prepare(
            &self.method,
            &self.url,
            &self.headers,
            &self.transaction_id,
            body,
            content_type,
        );
        Requester::new(prepared, self.response, self.transaction_id)
    }

    fn fail(self, err: BuildError) -> Requester<'a, T> {
        Requester::new(Err(err), self.response, self.transaction_id)
    }
}

fn prepare(
    method: &str,
    url: &str,
    caller_headers: &HashMap<String, Vec<String>>,
    transaction_id: &str,
    body: Vec<u8>,
    content_type: ContentType,
) -> Result<HttpRequest, BuildError> {
    let method = Method::from_bytes(method.as_bytes()).map_err(::http::Error::from)?;
    let uri = url.parse::<Uri>().map_err(::http::Error::from)?;
    let transaction = HeaderValue::from_str(transaction_id).map_err(::http::Error::from)?;

    let mut headers = HeaderMap::new();
    headers.insert(TRANSACTION_ID_HEADER, transaction.clone());

    for (name, values) in caller_headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(::http::Error::from)?;
        for value in values {
            let value = HeaderValue::from_str(value).map_err(::http::Error::from)?;
            headers.append(name.clone(), value);
        }
    }

    match content_type {
        ContentType::Fixed(value) => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(value));
        }
        ContentType::Declared(value) => {
            if !headers.contains_key(CONTENT_TYPE) {
                let value = HeaderValue::from_str(&value).map_err(::http::Error::from)?;
                headers.insert(CONTENT_TYPE, value);
            }
        }
    }

    if !transaction_id.is_empty() {
        headers.insert(X_TRANSACTION_ID_HEADER, transaction);
    }

    Ok(HttpRequest {
        method,
        uri,
        headers,
        body,
    })
}

fn file_access(field: &str) -> impl FnOnce(io::Error) -> BuildError + '_ {
    move |source| BuildError::FileAccess {
        field: field.to_string(),
        source,
    }
}

fn read_file<S: FileSource + ?Sized>(source: &S, field: &str) -> Result<Vec<u8>, BuildError> {
    let mut file = source.open_file(field).map_err(file_access(field))?;
    let mut body = Vec::new();
    io::copy(&mut file, &mut body).map_err(file_access(field))?;
    Ok(body)
}

fn encode_multipart<S: FileSource + ?Sized>(
    source: &S,
    files: &HashMap<String, String>,
    fields: &HashMap<String, String>,
) -> Result<(Vec<u8>, String), BuildError> {
    let mut writer = MultipartWriter::new(Vec::new());

    for (part_name, field) in files {
        let mut file = source.open_file(field).map_err(file_access(field))?;
        let part = writer
            .create_form_file(part_name, field)
            .map_err(BuildError::Encoding)?;
        io::copy(&mut file, part).map_err(file_access(field))?;
    }

    for (key, value) in fields {
        writer.write_field(key, value).map_err(BuildError::Encoding)?;
    }

    let content_type = writer.form_data_content_type();
    let body = writer.finish().map_err(BuildError::Encoding)?;
    Ok((body, content_type))
}
