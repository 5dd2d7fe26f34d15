//! Verify header construction and response decoding against the JSON test
//! vectors stored in `test-vectors/`.
//!
//! Responses are served by an in-process transport, so every decoding branch
//! is exercised without a network.

use std::collections::HashMap;
use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use http::{HeaderMap, HeaderValue};
use requester_core::{
    HttpRequest, HttpResponse, RecordingLog, RequestBuilder, RequestError, Transport,
    TransportError,
};
use serde_json::Value;

/// Serves one canned response.
struct CannedTransport {
    status: u16,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Transport for CannedTransport {
    fn execute(&self, _: HttpRequest) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse::from_bytes(
            self.status,
            self.headers.clone(),
            self.body.clone(),
        ))
    }
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn error_kind(err: &RequestError) -> &'static str {
    match err {
        RequestError::Build(_) => "Build",
        RequestError::Transport(_) => "Transport",
        RequestError::Decoding(_) => "Decoding",
        RequestError::Deserialization(_) => "Deserialization",
        RequestError::NonSuccessStatus(_) => "NonSuccessStatus",
    }
}

// ---------------------------------------------------------------------------
// Headers
// ---------------------------------------------------------------------------

#[test]
fn header_test_vectors() {
    let raw = include_str!("../../test-vectors/headers.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let headers: HashMap<String, Vec<String>> =
            serde_json::from_value(case["headers"].clone()).unwrap();

        let requester = RequestBuilder::new()
            .method("POST")
            .url("http://localhost:3000/things")
            .transaction_id(case["transaction_id"].as_str().unwrap())
            .headers(headers)
            .build_json(None::<&()>);
        let req = requester.prepared().unwrap();

        for (header, expected) in case["expected_headers"].as_object().unwrap() {
            let actual: Vec<&str> = req
                .headers
                .get_all(header.as_str())
                .iter()
                .map(|v| v.to_str().unwrap())
                .collect();
            let expected: Vec<&str> = expected
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_str().unwrap())
                .collect();
            assert_eq!(actual, expected, "{name}: header {header}");
        }

        for header in case["absent"].as_array().unwrap() {
            let header = header.as_str().unwrap();
            assert!(req.headers.get(header).is_none(), "{name}: {header} should be absent");
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let body = case["body"].as_str().unwrap().as_bytes();
        let compress = case["gzip"].as_bool().unwrap();
        let header_only = case["gzip_header_only"].as_bool().unwrap_or(false);

        let mut headers = HeaderMap::new();
        if compress || header_only {
            headers.insert(http::header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        }
        let transport = CannedTransport {
            status: case["status"].as_u64().unwrap() as u16,
            headers,
            body: if compress { gzip(body) } else { body.to_vec() },
        };

        let log = RecordingLog::new();
        let mut target = Value::Null;
        let outcome = RequestBuilder::new()
            .method("GET")
            .url("http://localhost:3000/things/1")
            .transaction_id("tx-vector")
            .response(&mut target)
            .build_json(None::<&()>)
            .send_with(&transport, &log);

        let expected_status = case["expected_status"].as_u64().unwrap() as u16;
        match case.get("expected_error").and_then(Value::as_str) {
            Some(kind) => {
                let err = outcome.unwrap_err();
                assert_eq!(error_kind(&err), kind, "{name}: error kind");
                assert_eq!(err.status(), expected_status, "{name}: status");
            }
            None => assert_eq!(outcome.unwrap(), expected_status, "{name}: status"),
        }

        assert_eq!(target, case["expected_target"], "{name}: target");

        let events = log.events();
        let expected_events = case["expected_log_events"].as_u64().unwrap() as usize;
        assert_eq!(events.len(), expected_events, "{name}: log events");
        for event in events {
            assert_eq!(event.transaction, "tx-vector", "{name}: logged transaction");
        }
    }
}
