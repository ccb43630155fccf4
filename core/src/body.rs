//! Request body encoders and the key/value helper.
//!
//! # Design
//! Encoders are pure: they return the exact bytes to put on the wire and
//! leave sending to the transport, so the framing can be checked without a
//! server.

use url::form_urlencoded;

use crate::connection::nonce;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";

/// Prefix of every generated multipart boundary.
pub const BOUNDARY_PREFIX: &str = "----WebKitFormBoundary";

const CRLF: &str = "\r\n";

/// Insertion-ordered string map. Re-inserting a key keeps its position and
/// replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    entries: Vec<(String, String)>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = FormFields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

/// Build a map from `key, value, key, value, ...`.
///
/// Returns `None` for an empty or odd-length list.
pub fn kv_map(kvs: &[&str]) -> Option<FormFields> {
    if kvs.is_empty() || kvs.len() % 2 != 0 {
        return None;
    }
    Some(kvs.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect())
}

/// `key=value&key=value`, values form-urlencoded, keys written raw.
pub fn encode_form(fields: Option<&FormFields>) -> Vec<u8> {
    let Some(fields) = fields else {
        return Vec::new();
    };
    let mut out = String::new();
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push('&');
        }
        out.push_str(key);
        out.push('=');
        out.extend(form_urlencoded::byte_serialize(value.as_bytes()));
    }
    out.into_bytes()
}

/// The JSON text verbatim, or nothing when it is absent or blank.
pub fn encode_json(json: Option<&str>) -> Vec<u8> {
    match json {
        Some(json) if !json.trim().is_empty() => json.as_bytes().to_vec(),
        _ => Vec::new(),
    }
}

/// A multipart/form-data body with exactly one file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multipart {
    boundary: String,
    field: String,
    filename: String,
    content_type: String,
}

impl Multipart {
    pub fn new(field: &str, filename: &str, content_type: &str) -> Self {
        Self::with_boundary(format!("{BOUNDARY_PREFIX}{}", nonce()), field, filename, content_type)
    }

    pub fn with_boundary(
        boundary: impl Into<String>,
        field: &str,
        filename: &str,
        content_type: &str,
    ) -> Self {
        Self {
            boundary: boundary.into(),
            field: field.to_string(),
            filename: filename.to_string(),
            content_type: content_type.to_string(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type_header(&self) -> String {
        format!("{MULTIPART_CONTENT_TYPE}; boundary={}", self.boundary)
    }

    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        let head = format!(
            "--{boundary}{CRLF}\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"{CRLF}\
             Content-Type: {content_type}{CRLF}{CRLF}",
            boundary = self.boundary,
            field = self.field,
            filename = self.filename,
            content_type = self.content_type,
        );
        let tail = format!("{CRLF}--{}--{CRLF}", self.boundary);

        let mut out = Vec::with_capacity(head.len() + data.len() + tail.len());
        out.extend_from_slice(head.as_bytes());
        out.extend_from_slice(data);
        out.extend_from_slice(tail.as_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_map_pairs_up_arguments() {
        let map = kv_map(&["a", "1", "b", "2"]).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some("1"));
        assert_eq!(map.get("b"), Some("2"));
    }

    #[test]
    fn kv_map_rejects_empty_and_odd() {
        assert!(kv_map(&[]).is_none());
        assert!(kv_map(&["a"]).is_none());
        assert!(kv_map(&["a", "1", "b"]).is_none());
    }

    #[test]
    fn kv_map_last_duplicate_wins() {
        let map = kv_map(&["a", "1", "b", "2", "a", "3"]).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some("3"));
    }

    #[test]
    fn insert_keeps_first_position() {
        let mut fields = FormFields::new();
        fields.insert("x", "1");
        fields.insert("y", "2");
        fields.insert("x", "3");
        let pairs: Vec<_> = fields.iter().collect();
        assert_eq!(pairs, vec![("x", "3"), ("y", "2")]);
    }

    #[test]
    fn form_encodes_values_only() {
        let fields = kv_map(&["a", "1", "b", "x y"]).unwrap();
        assert_eq!(encode_form(Some(&fields)), b"a=1&b=x+y");
    }

    #[test]
    fn form_percent_encodes_reserved_and_non_ascii() {
        let fields = kv_map(&["q key", "a&b=c/d", "name", "é*-._~"]).unwrap();
        assert_eq!(
            String::from_utf8(encode_form(Some(&fields))).unwrap(),
            "q key=a%26b%3Dc%2Fd&name=%C3%A9*-._%7E"
        );
    }

    #[test]
    fn form_without_fields_is_empty() {
        assert!(encode_form(None).is_empty());
        assert!(encode_form(Some(&FormFields::new())).is_empty());
    }

    #[test]
    fn json_is_written_verbatim() {
        assert_eq!(encode_json(Some(r#" {"a": 1} "#)), br#" {"a": 1} "#);
    }

    #[test]
    fn blank_json_writes_nothing() {
        assert!(encode_json(None).is_empty());
        assert!(encode_json(Some("")).is_empty());
        assert!(encode_json(Some(" \t\n")).is_empty());
    }

    #[test]
    fn multipart_framing_is_exact() {
        let part = Multipart::with_boundary("XYZ", "img1", "photo.jpg", "image/jpeg");
        let body = part.encode(&[0xFF, 0xD8]);

        let mut expected = b"--XYZ\r\nContent-Disposition: form-data; name=\"img1\"; filename=\"photo.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n".to_vec();
        expected.extend_from_slice(&[0xFF, 0xD8]);
        expected.extend_from_slice(b"\r\n--XYZ--\r\n");
        assert_eq!(body, expected);
        assert_eq!(part.content_type_header(), "multipart/form-data; boundary=XYZ");
    }

    #[test]
    fn generated_boundary_has_prefix_and_nonce() {
        let part = Multipart::new("file", "a.txt", "text/plain");
        let nonce = part.boundary().strip_prefix(BOUNDARY_PREFIX).unwrap();
        assert!(!nonce.is_empty());
        assert!(nonce.chars().all(|c| c.is_ascii_digit()));
    }
}
