//! Connection builder.
//!
//! # Design
//! A `Connection` is everything needed for one exchange: URL, optional
//! proxy, connect timeout and request headers. Headers can only be changed
//! while the caller still owns the handle; `get` and `post` consume it, so a
//! header can never be set after the first byte goes out.
//!
//! Output is always enabled: any handle may carry a body. A handle that is
//! never given one is sent as a GET.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::debug;
use url::Url;

use crate::config::ConnectOptions;
use crate::error::{HttpError, Result};
use crate::http::{HttpMethod, HttpResponse, RequestBody};
use crate::transport;

const USER_AGENT_PLATFORM: &str = "Windows";
const USER_AGENT_BROWSERS: [&str; 6] = ["Chrome", "Safari", "QQBrowser", "Mozilla", "Firefox", "IE"];

/// Nanosecond timestamp used to make user agents, boundaries and file names
/// distinct between calls.
pub(crate) fn nonce() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
}

/// `Windows/<nonce>/Chrome/Safari/QQBrowser/Mozilla/Firefox/IE`
pub fn user_agent() -> String {
    format!("{USER_AGENT_PLATFORM}/{}/{}", nonce(), USER_AGENT_BROWSERS.join("/"))
}

// Blank and single-character overrides are ignored.
fn is_meaningful(value: Option<&str>) -> Option<&str> {
    value.filter(|v| v.trim().chars().count() > 1)
}

/// One URL-bound request that has not been sent yet.
#[derive(Clone)]
pub struct Connection {
    url: String,
    /// Proxy as given by the caller, parsed once at build time.
    proxy: Option<(String, ureq::Proxy)>,
    timeout: Duration,
    headers: Vec<(String, String)>,
    max_body_bytes: Option<u64>,
}

impl Connection {
    /// Build a connection with the common headers set.
    ///
    /// `timeout` defaults to [`crate::DEFAULT_TIMEOUT_MS`] and only bounds
    /// connecting. `cookie` and `content_type` are ignored unless they hold
    /// more than one non-blank character.
    pub fn open(
        url: &str,
        content_type: Option<&str>,
        cookie: Option<&str>,
        proxy: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let defaults = ConnectOptions::default();
        let options = ConnectOptions {
            timeout_ms: timeout.map_or(defaults.timeout_ms, |t| {
                u64::try_from(t.as_millis()).unwrap_or(u64::MAX)
            }),
            proxy: proxy.map(str::to_string),
            ..defaults
        };
        Self::with_options(url, content_type, cookie, &options)
    }

    pub fn with_options(
        url: &str,
        content_type: Option<&str>,
        cookie: Option<&str>,
        options: &ConnectOptions,
    ) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| HttpError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(HttpError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme `{}`", parsed.scheme()),
            });
        }
        let proxy = match options.proxy.as_deref() {
            Some(raw) => {
                let parsed = ureq::Proxy::new(raw).map_err(|source| HttpError::InvalidProxy {
                    proxy: raw.to_string(),
                    source,
                })?;
                Some((raw.to_string(), parsed))
            }
            None => None,
        };

        let mut conn = Self {
            url: url.to_string(),
            proxy,
            timeout: options.timeout(),
            headers: Vec::new(),
            max_body_bytes: options.max_body_bytes,
        };
        if let Some(cookie) = is_meaningful(cookie) {
            conn.set_header("Cookie", cookie);
        }
        if let Some(content_type) = is_meaningful(content_type) {
            conn.set_header("Content-Type", content_type);
        }
        conn.set_header("Upgrade-Insecure-Requests", "1");
        conn.set_header("User-Agent", user_agent());

        debug!(url = %conn.url, proxy = ?conn.proxy(), timeout_ms = options.timeout_ms, "connection built");
        Ok(conn)
    }

    /// Set a request header, replacing any value under the same name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_ref().map(|(raw, _)| raw.as_str())
    }

    pub(crate) fn proxy_config(&self) -> Option<&ureq::Proxy> {
        self.proxy.as_ref().map(|(_, parsed)| parsed)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_body_bytes(&self) -> Option<u64> {
        self.max_body_bytes
    }

    /// Send without a body.
    pub fn get(self) -> Result<HttpResponse> {
        transport::send(self, HttpMethod::Get, RequestBody::None)
    }

    /// Write `body` and send.
    pub fn post(self, body: RequestBody) -> Result<HttpResponse> {
        transport::send(self, HttpMethod::Post, body)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("url", &self.url)
            .field("proxy", &self.proxy())
            .field("timeout", &self.timeout)
            .field("headers", &self.headers)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}
