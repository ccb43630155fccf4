//! Response body and status-line readers.
//!
//! # Design
//! Bodies are read to the end through a fixed 4096-byte chunk. Text is read
//! line by line and the lines are joined with no separator, so a multi-line
//! body comes back as one line: `"abc\ndef"` reads as `"abcdef"`. Existing
//! callers depend on that shape.
//!
//! Buffering is unbounded unless the caller passes a limit.

use std::borrow::Cow;
use std::io::{self, BufRead, BufReader, Read};
use std::str::FromStr;

use crate::error::{HttpError, Result};

/// Read granularity for response bodies.
pub const CHUNK_SIZE: usize = 4096;

/// Character sets accepted by `read_text`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Charset {
    #[default]
    Utf8,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
    Ascii,
}

impl Charset {
    /// Decode `bytes`, replacing malformed or unmappable input with U+FFFD.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        match self {
            Charset::Utf8 => String::from_utf8_lossy(bytes),
            Charset::Latin1 => Cow::Owned(bytes.iter().map(|&b| b as char).collect()),
            Charset::Ascii => {
                if bytes.is_ascii() {
                    // ASCII is valid UTF-8.
                    String::from_utf8_lossy(bytes)
                } else {
                    Cow::Owned(
                        bytes
                            .iter()
                            .map(|&b| if b.is_ascii() { b as char } else { char::REPLACEMENT_CHARACTER })
                            .collect(),
                    )
                }
            }
        }
    }
}

impl FromStr for Charset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Charset::Utf8),
            "iso-8859-1" | "iso8859-1" | "iso_8859_1" | "latin1" | "latin-1" => Ok(Charset::Latin1),
            "us-ascii" | "ascii" => Ok(Charset::Ascii),
            other => Err(format!("unsupported charset: {other}")),
        }
    }
}

/// Read `reader` to EOF into memory.
pub fn read_bytes(mut reader: impl Read, limit: Option<u64>) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        out.extend_from_slice(&chunk[..n]);
        check_limit(out.len(), limit)?;
    }
    Ok(out)
}

/// Read `reader` to EOF as text, dropping every line terminator.
///
/// `\n`, `\r\n` and a lone `\r` all end a line.
pub fn read_text(reader: impl Read, charset: Charset, limit: Option<u64>) -> Result<String> {
    // One byte past the cap is enough to report it; a line with no
    // terminator must not pull the rest of the stream into memory.
    let reader = reader.take(limit.map_or(u64::MAX, |l| l.saturating_add(1)));
    let mut reader = BufReader::with_capacity(CHUNK_SIZE, reader);
    let mut out = String::new();
    let mut line = Vec::new();
    let mut total = 0usize;
    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line)?;
        if n == 0 {
            break;
        }
        total += n;
        check_limit(total, limit)?;
        out.extend(charset.decode(&line).chars().filter(|c| !matches!(c, '\r' | '\n')));
    }
    Ok(out)
}

/// Second whitespace-separated token of a status line, as a number.
pub fn parse_status_code(status_line: &str) -> Result<u16> {
    status_line
        .split_whitespace()
        .nth(1)
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| HttpError::MalformedStatusLine(status_line.to_string()))
}

fn check_limit(read: usize, limit: Option<u64>) -> Result<()> {
    match limit {
        Some(limit) if read as u64 > limit => Err(HttpError::BodyTooLarge { limit }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out at most `step` bytes per `read` call.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    /// Endless stream of `a` with no line terminator; counts bytes handed out.
    struct Endless {
        pulled: usize,
    }

    impl Read for Endless {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            buf.fill(b'a');
            self.pulled += buf.len();
            Ok(buf.len())
        }
    }

    #[test]
    fn read_bytes_spans_many_chunks() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let out = read_bytes(data.as_slice(), None).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn read_bytes_short_reads() {
        let out = read_bytes(Trickle { data: b"hello world", step: 3 }, None).unwrap();
        assert_eq!(out, b"hello world");
    }

    #[test]
    fn read_bytes_empty() {
        assert!(read_bytes(&b""[..], None).unwrap().is_empty());
    }

    #[test]
    fn read_bytes_at_limit_is_allowed() {
        assert_eq!(read_bytes(&b"1234"[..], Some(4)).unwrap(), b"1234");
        let err = read_bytes(&b"12345"[..], Some(4)).unwrap_err();
        assert!(matches!(err, HttpError::BodyTooLarge { limit: 4 }));
    }

    #[test]
    fn read_bytes_stops_pulling_past_limit() {
        let mut source = Endless { pulled: 0 };
        let err = read_bytes(&mut source, Some(10)).unwrap_err();
        assert!(matches!(err, HttpError::BodyTooLarge { limit: 10 }));
        assert!(source.pulled <= 10 + CHUNK_SIZE);
    }

    #[test]
    fn read_text_stops_pulling_past_limit_without_newline() {
        let mut source = Endless { pulled: 0 };
        let err = read_text(&mut source, Charset::Utf8, Some(10)).unwrap_err();
        assert!(matches!(err, HttpError::BodyTooLarge { limit: 10 }));
        assert!(source.pulled <= 10 + CHUNK_SIZE);
    }

    #[test]
    fn read_text_at_limit_is_allowed() {
        assert_eq!(read_text(&b"ab\ncd"[..], Charset::Utf8, Some(5)).unwrap(), "abcd");
        let err = read_text(&b"ab\ncde"[..], Charset::Utf8, Some(5)).unwrap_err();
        assert!(matches!(err, HttpError::BodyTooLarge { limit: 5 }));
    }

    #[test]
    fn read_text_joins_lines_without_separator() {
        assert_eq!(read_text(&b"abc\ndef"[..], Charset::Utf8, None).unwrap(), "abcdef");
    }

    #[test]
    fn read_text_drops_every_terminator_style() {
        let text = read_text(&b"a\r\nb\rc\n\nd\n"[..], Charset::Utf8, None).unwrap();
        assert_eq!(text, "abcd");
    }

    #[test]
    fn read_text_keeps_multibyte_across_short_reads() {
        let body = "héllo\nwörld".as_bytes();
        let text = read_text(Trickle { data: body, step: 1 }, Charset::Utf8, None).unwrap();
        assert_eq!(text, "héllowörld");
    }

    #[test]
    fn read_text_latin1() {
        let text = read_text(&[0x63, 0x61, 0x66, 0xE9][..], Charset::Latin1, None).unwrap();
        assert_eq!(text, "café");
    }

    #[test]
    fn read_text_ascii_replaces_high_bytes() {
        let text = read_text(&[b'o', b'k', 0xFF][..], Charset::Ascii, None).unwrap();
        assert_eq!(text, "ok\u{FFFD}");
    }

    #[test]
    fn read_text_utf8_replaces_malformed() {
        let text = read_text(&[b'a', 0xC3, b'\n', b'b'][..], Charset::Utf8, None).unwrap();
        assert_eq!(text, "a\u{FFFD}b");
    }

    #[test]
    fn charset_labels() {
        assert_eq!("UTF-8".parse::<Charset>().unwrap(), Charset::Utf8);
        assert_eq!("ISO-8859-1".parse::<Charset>().unwrap(), Charset::Latin1);
        assert_eq!(" us-ascii ".parse::<Charset>().unwrap(), Charset::Ascii);
        assert!("ebcdic".parse::<Charset>().is_err());
        assert_eq!(Charset::default(), Charset::Utf8);
    }

    #[test]
    fn status_code_from_status_line() {
        assert_eq!(parse_status_code("HTTP/1.1 404 Not Found").unwrap(), 404);
        assert_eq!(parse_status_code("HTTP/1.0   200 OK").unwrap(), 200);
        assert_eq!(parse_status_code("HTTP/2 204").unwrap(), 204);
    }

    #[test]
    fn status_code_missing_token_fails() {
        let err = parse_status_code("HTTP/1.1").unwrap_err();
        assert!(matches!(err, HttpError::MalformedStatusLine(_)));
        assert!(parse_status_code("").is_err());
        assert!(parse_status_code("HTTP/1.1 OK").is_err());
    }
}
