//! Executes a `Connection` over ureq.
//!
//! A fresh agent is built per exchange, so nothing is shared between calls.
//! Error statuses come back as data; reading their body is refused later by
//! `HttpResponse`.

use tracing::debug;
use ureq::http::Response;
use ureq::Body;

use crate::connection::Connection;
use crate::error::Result;
use crate::http::{HttpMethod, HttpResponse, RequestBody};

pub(crate) fn send(conn: Connection, method: HttpMethod, body: RequestBody) -> Result<HttpResponse> {
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_connect(Some(conn.timeout()))
        .proxy(conn.proxy_config().cloned())
        .build()
        .new_agent();

    debug!(
        method = method.as_str(),
        url = conn.url(),
        body_len = body.as_bytes().len(),
        "sending request"
    );

    let response = match method {
        HttpMethod::Get => {
            let mut req = agent.get(conn.url());
            for (name, value) in conn.headers() {
                req = req.header(name, value);
            }
            req.call()?
        }
        HttpMethod::Post => {
            let mut req = agent.post(conn.url());
            for (name, value) in conn.headers() {
                req = req.header(name, value);
            }
            req.send(body.as_bytes())?
        }
    };

    let response = into_response(response, conn.max_body_bytes());
    debug!(status_line = %response.status_line, "response received");
    Ok(response)
}

fn into_response(response: Response<Body>, limit: Option<u64>) -> HttpResponse {
    let status = response.status();
    let status_line = match status.canonical_reason() {
        Some(reason) => format!("{:?} {} {reason}", response.version(), status.as_u16()),
        None => format!("{:?} {}", response.version(), status.as_u16()),
    };
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    HttpResponse::new(status_line, headers, response.into_body().into_reader()).with_limit(limit)
}
