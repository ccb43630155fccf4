use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{Multipart, Path},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{debug, info};

/// Multi-line body served by `/text`.
pub const TEXT_BODY: &str = "abc\ndef\r\nghi";

/// What `/upload` saw in the single file part it received.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub field: String,
    pub filename: String,
    pub content_type: String,
    pub len: usize,
}

/// Deterministic binary payload served by `/bytes`, larger than one read chunk.
pub fn binary_body() -> Vec<u8> {
    (0..10_000u32).map(|i| (i % 256) as u8).collect()
}

pub fn app() -> Router {
    Router::new()
        .route("/text", get(text))
        .route("/bytes", get(bytes))
        .route("/echo", post(echo))
        .route("/headers", get(headers).post(headers))
        .route("/upload", post(upload))
        .route("/status/{code}", get(status))
        .route("/created", get(created))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    info!(addr = ?listener.local_addr().ok(), "mock server listening");
    axum::serve(listener, app()).await
}

async fn text() -> &'static str {
    TEXT_BODY
}

async fn bytes() -> Vec<u8> {
    binary_body()
}

async fn echo(body: Bytes) -> Bytes {
    debug!(len = body.len(), "echo");
    body
}

async fn headers(headers: HeaderMap) -> Json<BTreeMap<String, String>> {
    Json(
        headers
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect(),
    )
}

async fn upload(mut multipart: Multipart) -> Result<Json<UploadReceipt>, (StatusCode, String)> {
    let bad_request = |e: axum::extract::multipart::MultipartError| (StatusCode::BAD_REQUEST, e.to_string());

    let field = multipart
        .next_field()
        .await
        .map_err(bad_request)?
        .ok_or((StatusCode::BAD_REQUEST, "no file part".to_string()))?;
    let receipt_head = (
        field.name().unwrap_or_default().to_string(),
        field.file_name().unwrap_or_default().to_string(),
        field.content_type().unwrap_or_default().to_string(),
    );
    let data = field.bytes().await.map_err(bad_request)?;

    if multipart.next_field().await.map_err(bad_request)?.is_some() {
        return Err((StatusCode::BAD_REQUEST, "more than one part".to_string()));
    }

    let (field, filename, content_type) = receipt_head;
    Ok(Json(UploadReceipt {
        field,
        filename,
        content_type,
        len: data.len(),
    }))
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, format!("status {code}")))
}

async fn created() -> (StatusCode, [(header::HeaderName, &'static str); 1], &'static str) {
    (StatusCode::CREATED, [(header::LOCATION, "/items/42")], "created")
}
