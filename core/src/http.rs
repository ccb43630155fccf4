//! HTTP value types shared by the builder, the writers and the reader.
//!
//! # Design
//! The request side is described by `Connection` (see `connection.rs`) and
//! `RequestBody`; the response side by `HttpResponse`, which owns the body
//! stream. `into_bytes` / `into_text` take `self`, so a body can be consumed
//! exactly once and the stream is dropped on every exit path.

use std::fmt;
use std::io::Read;

use tracing::warn;

use crate::error::{HttpError, Result};
use crate::reader::{self, Charset};

/// HTTP method for an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// Body encoding for one request. The variants are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    None,
    Form(Vec<u8>),
    Json(Vec<u8>),
    Multipart(Vec<u8>),
}

impl RequestBody {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            RequestBody::None => &[],
            RequestBody::Form(b) | RequestBody::Json(b) | RequestBody::Multipart(b) => b,
        }
    }
}

/// A received response: status line, headers, and a body read at most once.
pub struct HttpResponse {
    pub status_line: String,
    pub headers: Vec<(String, String)>,
    body: Box<dyn Read + Send>,
    limit: Option<u64>,
}

impl HttpResponse {
    pub fn new(
        status_line: impl Into<String>,
        headers: Vec<(String, String)>,
        body: impl Read + Send + 'static,
    ) -> Self {
        Self {
            status_line: status_line.into(),
            headers,
            body: Box::new(body),
            limit: None,
        }
    }

    /// Cap the number of body bytes `into_bytes` / `into_text` will buffer.
    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn status_code(&self) -> Result<u16> {
        reader::parse_status_code(&self.status_line)
    }

    /// First header whose name matches case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Raw `Location` header; relative values are returned as-is.
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    pub fn into_bytes(self) -> Result<Vec<u8>> {
        self.ensure_readable()?;
        reader::read_bytes(self.body, self.limit)
    }

    /// Body decoded with `charset`, line terminators removed.
    pub fn into_text(self, charset: Charset) -> Result<String> {
        self.ensure_readable()?;
        reader::read_text(self.body, charset, self.limit)
    }

    // Error statuses have no readable input stream.
    fn ensure_readable(&self) -> Result<()> {
        let status = self.status_code()?;
        if status >= 400 {
            warn!(status, "refusing to read body of error response");
            return Err(HttpError::Status { status });
        }
        Ok(())
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status_line", &self.status_line)
            .field("headers", &self.headers)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}
