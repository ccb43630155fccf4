//! Error types for the HTTP helper.
//!
//! # Design
//! Every failure is fatal to the operation that hit it: there is no retry and
//! no partial success. The variants only exist so callers can tell a bad URL
//! from a refused connection when logging; none of them is "retryable".
//! `kv_map` is the one helper that reports malformed input with `None`
//! instead of an error.

use thiserror::Error;

/// Result alias used by every fallible helper.
pub type Result<T> = std::result::Result<T, HttpError>;

#[derive(Debug, Error)]
pub enum HttpError {
    /// The URL did not parse, or its scheme is not http/https.
    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid proxy `{proxy}`: {source}")]
    InvalidProxy {
        proxy: String,
        #[source]
        source: ureq::Error,
    },

    /// Connecting, writing the body, or receiving the response head failed.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// Reading the response body failed midway.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed status line: {0:?}")]
    MalformedStatusLine(String),

    /// The server answered with an error status, so there is no body to read.
    #[error("server returned HTTP {status}")]
    Status { status: u16 },

    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: u64 },

    #[error("invalid options: {0}")]
    Config(#[from] serde_json::Error),
}
