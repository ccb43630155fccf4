//! Connection options.
//!
//! # Design
//! `ConnectOptions` carries the knobs a caller may want to set once and reuse
//! for many calls: connect timeout, pass-through proxy and an optional body
//! cap. It derives `Deserialize` so it can live in an application's config
//! file; every field has a default so `{}` is a valid document.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Connect timeout applied when the caller does not pass one.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectOptions {
    /// Connect timeout in milliseconds. There is no read timeout.
    pub timeout_ms: u64,

    /// Proxy URI such as `http://127.0.0.1:8080` or `socks5://host:1080`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    /// Upper bound on buffered response bodies. `None` reads until EOF.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_body_bytes: Option<u64>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            proxy: None,
            max_body_bytes: None,
        }
    }
}

impl ConnectOptions {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
