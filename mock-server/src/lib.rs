use std::collections::BTreeMap;
use std::io::Write;

use axum::{
    body::Bytes,
    extract::{Multipart, Path},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use flate2::{write::GzEncoder, Compression};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// What `/inspect` saw of a request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Inspection {
    pub headers: BTreeMap<String, Vec<String>>,
    pub content_type: Option<String>,
    pub body_len: usize,
}

/// One part of a multipart form received by `/upload`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content: String,
}

/// Document served by `/gzip`.
pub fn sample_document() -> Value {
    json!({
        "id": "doc-1",
        "title": "Compressed payload",
        "tags": ["gzip", "json"],
        "size": 42
    })
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", post(echo))
        .route("/status/{code}", get(status))
        .route("/gzip", get(gzipped))
        .route("/text", get(text))
        .route("/inspect", post(inspect))
        .route("/upload", post(upload))
        .route("/method", any(reflect_method))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(Json(body): Json<Value>) -> Json<Value> {
    Json(body)
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, Json(json!({ "status": code }))))
}

async fn gzipped() -> Result<Response, StatusCode> {
    let raw = serde_json::to_vec(&sample_document()).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&raw)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let compressed = encoder.finish().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CONTENT_ENCODING, "gzip"),
        ],
        compressed,
    )
        .into_response())
}

async fn text() -> &'static str {
    "plain text, not json"
}

async fn reflect_method(method: Method) -> Json<Value> {
    Json(json!({ "method": method.as_str() }))
}

async fn inspect(headers: HeaderMap, body: Bytes) -> Json<Inspection> {
    let mut seen: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers.iter() {
        seen.entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(Inspection {
        headers: seen,
        content_type,
        body_len: body.len(),
    })
}

async fn upload(mut multipart: Multipart) -> Result<Json<Vec<UploadedPart>>, StatusCode> {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|_| StatusCode::BAD_REQUEST)? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        parts.push(UploadedPart {
            name,
            file_name,
            content: String::from_utf8_lossy(&content).into_owned(),
        });
    }
    parts.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(parts))
}
