//! One-call helpers: open a connection, write a body, read the reply.
//!
//! # Design
//! Every helper is a free function parameterized only by its arguments and
//! performs exactly one exchange. The `*_with` variants take a prepared
//! `Connection` for callers that need a cookie, proxy or custom header.
//! Replies of the writers are decoded as UTF-8 with line breaks removed.

use std::time::Duration;

use crate::body::{encode_form, encode_json, FormFields, Multipart, FORM_CONTENT_TYPE, JSON_CONTENT_TYPE};
use crate::connection::{nonce, Connection};
use crate::error::Result;
use crate::http::RequestBody;
use crate::reader::Charset;

/// Field name used by [`upload_image`].
pub const IMAGE_FIELD: &str = "img1";
pub const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

fn plain(url: &str) -> Result<Connection> {
    Connection::open(url, None, None, None, None)
}

/// Download `url` into memory.
pub fn get_data(url: &str) -> Result<Vec<u8>> {
    plain(url)?.get()?.into_bytes()
}

/// Fetch `url` as UTF-8 text.
pub fn get_content(url: &str) -> Result<String> {
    content_with(plain(url)?, Charset::Utf8)
}

/// Send `conn` without a body and decode the reply with `charset`.
pub fn content_with(conn: Connection, charset: Charset) -> Result<String> {
    conn.get()?.into_text(charset)
}

/// Numeric status of a bodiless request to `url`. Error statuses are
/// returned, not raised.
pub fn response_code(
    url: &str,
    content_type: Option<&str>,
    cookie: Option<&str>,
    proxy: Option<&str>,
    timeout: Option<Duration>,
) -> Result<u16> {
    Connection::open(url, content_type, cookie, proxy, timeout)?
        .get()?
        .status_code()
}

pub fn post_form(url: &str, fields: Option<&FormFields>) -> Result<String> {
    let conn = Connection::open(url, Some(FORM_CONTENT_TYPE), None, None, None)?;
    post_form_with(conn, fields)
}

/// Absent or empty `fields` still performs the exchange with an empty body.
pub fn post_form_with(conn: Connection, fields: Option<&FormFields>) -> Result<String> {
    conn.post(RequestBody::Form(encode_form(fields)))?
        .into_text(Charset::Utf8)
}

pub fn post_json(url: &str, json: Option<&str>) -> Result<String> {
    let conn = Connection::open(url, Some(JSON_CONTENT_TYPE), None, None, None)?;
    post_json_with(conn, json)
}

pub fn post_json_with(conn: Connection, json: Option<&str>) -> Result<String> {
    conn.post(RequestBody::Json(encode_json(json)))?
        .into_text(Charset::Utf8)
}

/// Upload `data` as the single file part `field` of a multipart form.
pub fn upload_file(
    data: &[u8],
    url: &str,
    field: &str,
    filename: &str,
    content_type: &str,
) -> Result<String> {
    let mut conn = plain(url)?;
    let part = Multipart::new(field, filename, content_type);
    conn.set_header("Content-Type", part.content_type_header());
    conn.post(RequestBody::Multipart(part.encode(data)))?
        .into_text(Charset::Utf8)
}

/// Upload a JPEG as `img1` under a generated `<nonce>.jpg` name.
pub fn upload_image(data: &[u8], url: &str) -> Result<String> {
    upload_file(data, url, IMAGE_FIELD, &format!("{}.jpg", nonce()), IMAGE_CONTENT_TYPE)
}
