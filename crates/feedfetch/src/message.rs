//! HTTP/1.x response message parser.
//!
//! Turns a fully buffered response (status line, header block, body) into a
//! [`Message`]. The buffer may carry several header blocks back to back when
//! earlier hops were recorded without bodies; the caller says how many to
//! skip. Interim `1xx` responses are always skipped.

use crate::error::{FetchError, Result};
use crate::headers::Headers;

/// Maximum length of one chunk-size line, extensions included.
const MAX_CHUNK_LINE_LEN: usize = 4096;

/// Parsed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Message {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

/// Parse `raw`, skipping the first `skip_blocks` header blocks.
pub(crate) fn parse_response(raw: &[u8], skip_blocks: usize) -> Result<Message> {
    let mut rest = raw;
    let mut skipped = 0;

    loop {
        let (head, after) = split_head(rest)?;
        let (status, headers) = parse_head(head)?;

        if skipped < skip_blocks {
            skipped += 1;
            rest = after;
            continue;
        }
        // 101 ends the HTTP exchange; every other 1xx precedes the real answer.
        if (100..200).contains(&status) && status != 101 {
            rest = after;
            continue;
        }

        let body = read_body(status, &headers, after)?;
        return Ok(Message {
            status,
            headers,
            body,
        });
    }
}

/// Split off one header block, returning it (without the blank line) and
/// the bytes after it. Bare `\n` line endings are tolerated.
fn split_head(buf: &[u8]) -> Result<(&[u8], &[u8])> {
    if buf.is_empty() {
        return Err(FetchError::Protocol("empty response".into()));
    }
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n");
    let lf = buf.windows(2).position(|w| w == b"\n\n");
    match (crlf, lf) {
        (Some(c), Some(l)) if l < c => Ok((&buf[..l], &buf[l + 2..])),
        (Some(c), _) => Ok((&buf[..c], &buf[c + 4..])),
        (None, Some(l)) => Ok((&buf[..l], &buf[l + 2..])),
        (None, None) => Err(FetchError::Protocol("incomplete header block".into())),
    }
}

fn parse_head(head: &[u8]) -> Result<(u16, Headers)> {
    let text = String::from_utf8_lossy(head);
    let mut lines = text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));

    let status_line = lines
        .next()
        .ok_or_else(|| FetchError::Protocol("missing status line".into()))?;
    let status = parse_status_line(status_line)?;

    let mut fields: Vec<(String, String)> = Vec::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        // obs-fold: continuation of the previous field value
        if line.starts_with([' ', '\t']) {
            if let Some((_, value)) = fields.last_mut() {
                value.push(' ');
                value.push_str(line.trim());
                continue;
            }
            return Err(FetchError::Protocol("continuation line before any header".into()));
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| FetchError::Protocol(format!("malformed header line: {line:?}")))?;
        let name = name.trim_end();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(FetchError::Protocol(format!("invalid header name: {name:?}")));
        }
        fields.push((name.to_string(), value.trim().to_string()));
    }

    let mut headers = Headers::new();
    for (name, value) in fields {
        headers.append(name, value);
    }
    Ok((status, headers))
}

/// `HTTP/1.x SP 3DIGIT [SP reason]`
fn parse_status_line(line: &str) -> Result<u16> {
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or("");
    if !version.starts_with("HTTP/") {
        return Err(FetchError::Protocol(format!("bad status line: {line:?}")));
    }
    let code = parts.next().unwrap_or("");
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FetchError::Protocol(format!("bad status code in: {line:?}")));
    }
    code.parse::<u16>()
        .map_err(|_| FetchError::Protocol(format!("bad status code in: {line:?}")))
}

fn read_body(status: u16, headers: &Headers, rest: &[u8]) -> Result<Vec<u8>> {
    if (100..200).contains(&status) || status == 204 || status == 304 {
        return Ok(Vec::new());
    }

    let chunked = headers
        .raw("transfer-encoding")
        .map(|v| v.joined())
        .and_then(|te| te.rsplit(',').next().map(|last| last.trim().eq_ignore_ascii_case("chunked")))
        .unwrap_or(false);
    if chunked {
        return decode_chunked(rest);
    }

    if let Some(length) = headers.raw("content-length").and_then(|v| v.first()) {
        let length: usize = length
            .trim()
            .parse()
            .map_err(|_| FetchError::Protocol(format!("invalid content-length: {length:?}")))?;
        // A short read keeps what arrived; the caller already saw end-of-stream.
        return Ok(rest[..length.min(rest.len())].to_vec());
    }

    Ok(rest.to_vec())
}

/// Decode a `Transfer-Encoding: chunked` body. Trailers are discarded.
fn decode_chunked(mut src: &[u8]) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    loop {
        let (line, after) = split_line(src)?;
        let size = parse_chunk_size_line(line)?;
        src = after;
        if size == 0 {
            break;
        }
        if src.len() < size {
            return Err(FetchError::Protocol("truncated chunk data".into()));
        }
        body.extend_from_slice(&src[..size]);
        src = &src[size..];
        src = src
            .strip_prefix(b"\r\n")
            .or_else(|| src.strip_prefix(b"\n"))
            .ok_or_else(|| FetchError::Protocol("missing CRLF after chunk".into()))?;
    }

    // Trailer section: lines up to an empty one, or simply end of input.
    while !src.is_empty() {
        let (line, after) = split_line(src)?;
        src = after;
        if line.is_empty() {
            break;
        }
    }
    Ok(body)
}

fn split_line(src: &[u8]) -> Result<(&[u8], &[u8])> {
    let Some(end) = src.iter().position(|&b| b == b'\n') else {
        return Err(FetchError::Protocol("truncated chunked body".into()));
    };
    if end > MAX_CHUNK_LINE_LEN {
        return Err(FetchError::Protocol("chunk line too long".into()));
    }
    let line = &src[..end];
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    Ok((line, &src[end + 1..]))
}

fn parse_chunk_size_line(line: &[u8]) -> Result<usize> {
    let line = std::str::from_utf8(line)
        .map_err(|_| FetchError::Protocol("non-ASCII chunk size".into()))?;
    let size_part = line.split(';').next().unwrap_or("").trim();
    if size_part.is_empty() {
        return Err(FetchError::Protocol("empty chunk size".into()));
    }
    usize::from_str_radix(size_part, 16)
        .map_err(|_| FetchError::Protocol(format!("bad chunk size: {size_part:?}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::headers::HeaderValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_response() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: text/xml\r\nContent-Length: 5\r\n\r\nhello";
        let msg = parse_response(raw, 0).unwrap();
        assert_eq!(msg.status, 200);
        assert_eq!(msg.headers.get("content-type"), vec!["text/xml"]);
        assert_eq!(msg.body, b"hello");
    }

    #[test]
    fn test_content_length_truncates_extra_bytes() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\nabcdef";
        assert_eq!(parse_response(raw, 0).unwrap().body, b"abc");
    }

    #[test]
    fn test_eof_delimited_body() {
        let raw = b"HTTP/1.0 200 OK\r\nServer: x\r\n\r\n<rss/>\n";
        assert_eq!(parse_response(raw, 0).unwrap().body, b"<rss/>\n");
    }

    #[test]
    fn test_chunked_body() {
        let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n\
                    5\r\nhello\r\n7;ext=1\r\n, world\r\n0\r\nX-Trailer: y\r\n\r\n";
        assert_eq!(parse_response(raw, 0).unwrap().body, b"hello, world");
    }

    #[test]
    fn test_truncated_chunked_body_is_error() {
        let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nff\r\nshort";
        assert!(matches!(
            parse_response(raw, 0),
            Err(FetchError::Protocol(_))
        ));
    }

    #[test]
    fn test_skips_interim_continue() {
        let raw = b"HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 204 No Content\r\nX-A: 1\r\n\r\n";
        let msg = parse_response(raw, 0).unwrap();
        assert_eq!(msg.status, 204);
        assert!(msg.body.is_empty());
    }

    #[test]
    fn test_skip_blocks_selects_final_message() {
        let raw = b"HTTP/1.1 301 Moved\r\nLocation: /b\r\n\r\n\
                    HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok";
        let msg = parse_response(raw, 1).unwrap();
        assert_eq!(msg.status, 200);
        assert!(!msg.headers.contains("location"));
        assert_eq!(msg.body, b"ok");
    }

    #[test]
    fn test_repeated_and_folded_headers() {
        let raw = b"HTTP/1.1 200 OK\r\nSet-Cookie: a=1\r\nX-Long: first\r\n  second\r\nset-cookie: b=2\r\n\r\n";
        let msg = parse_response(raw, 0).unwrap();
        assert_eq!(
            msg.headers.raw("Set-Cookie"),
            Some(&HeaderValue::List(vec!["a=1".into(), "b=2".into()]))
        );
        assert_eq!(msg.headers.get("x-long"), vec!["first second"]);
    }

    #[test]
    fn test_bare_lf_line_endings() {
        let raw = b"HTTP/1.1 200 OK\nContent-Type: text/plain\n\nbody";
        let msg = parse_response(raw, 0).unwrap();
        assert_eq!(msg.headers.get("content-type"), vec!["text/plain"]);
        assert_eq!(msg.body, b"body");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_response(b"", 0).is_err());
        assert!(parse_response(b"<html>no headers</html>", 0).is_err());
        assert!(parse_response(b"SMTP 220 hello\r\n\r\n", 0).is_err());
        assert!(parse_response(b"HTTP/1.1 2xx OK\r\n\r\n", 0).is_err());
        assert!(parse_response(b"HTTP/1.1 200 OK\r\nno colon here\r\n\r\n", 0).is_err());
    }
}
