//! Blocking HTTP helpers: GET, form POST, JSON POST and single-file
//! multipart upload, with responses read as bytes or text.
//!
//! # Overview
//! Every call is a straight line: build a `Connection` (URL, proxy, connect
//! timeout, headers), optionally write one body, read the response once.
//! There is no pooling, no retry and no shared state, so the helpers can be
//! called from any number of threads.
//!
//! # Design
//! - `connection` builds handles and sets the common headers.
//! - `body` holds the pure encoders (form, JSON, multipart) and `kv_map`.
//! - `transport` is the only module that touches the network (ureq).
//! - `reader` turns a body stream into bytes or text and parses status lines.
//! - `client` composes the above into one-call helpers.

pub mod body;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod http;
pub mod reader;
mod transport;

pub use body::{encode_form, encode_json, kv_map, FormFields, Multipart};
pub use client::{
    content_with, get_content, get_data, post_form, post_form_with, post_json, post_json_with,
    response_code, upload_file, upload_image,
};
pub use config::{ConnectOptions, DEFAULT_TIMEOUT_MS};
pub use connection::{user_agent, Connection};
pub use error::{HttpError, Result};
pub use http::{HttpMethod, HttpResponse, RequestBody};
pub use reader::{parse_status_code, read_bytes, read_text, Charset};
