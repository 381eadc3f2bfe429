//! Content-coding decoder for bodies the transport left compressed.

use std::io::Read;

use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};

use crate::error::{FetchError, Result};
use crate::headers::Headers;

/// Decode `body` according to the `content-encoding` header.
///
/// Returns `Ok(None)` when there is no coding to undo. On error the caller
/// keeps the body it already has.
pub(crate) fn decode_content(headers: &Headers, body: &[u8]) -> Result<Option<Vec<u8>>> {
    let Some(coding) = headers.raw("content-encoding").map(|v| v.joined()) else {
        return Ok(None);
    };
    let coding = coding
        .trim_matches(|c| matches!(c, '\t' | '\n' | '\r' | ' '))
        .to_ascii_lowercase();

    match coding.as_str() {
        "gzip" | "x-gzip" => gunzip(body)
            .map(|data| Some(trim_body(&data).to_vec()))
            .ok_or(FetchError::Decode { coding: "gzip" }),
        "deflate" => inflate(body)
            .or_else(|| inflate_zlib(body))
            .or_else(|| gunzip(body))
            .map(Some)
            .ok_or(FetchError::Decode { coding: "deflate" }),
        _ => Err(FetchError::UnknownContentCoding(coding)),
    }
}

fn read_all(mut reader: impl Read) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out).ok()?;
    Some(out)
}

fn gunzip(data: &[u8]) -> Option<Vec<u8>> {
    read_all(GzDecoder::new(data))
}

/// Raw DEFLATE (RFC 1951), what most servers actually send for `deflate`.
fn inflate(data: &[u8]) -> Option<Vec<u8>> {
    read_all(DeflateDecoder::new(data))
}

/// zlib-wrapped DEFLATE (RFC 1950), what the RFC says `deflate` means.
fn inflate_zlib(data: &[u8]) -> Option<Vec<u8>> {
    read_all(ZlibDecoder::new(data))
}

/// Strip leading and trailing ASCII whitespace and NUL bytes.
pub(crate) fn trim_body(body: &[u8]) -> &[u8] {
    let is_space = |b: &u8| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\0' | 0x0b);
    let start = body.iter().position(|b| !is_space(b)).unwrap_or(body.len());
    let end = body.iter().rposition(|b| !is_space(b)).map_or(start, |p| p + 1);
    &body[start..end]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::{DeflateEncoder, GzEncoder, ZlibEncoder};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const FEED: &[u8] = b"<?xml version=\"1.0\"?><rss><channel><title>t</title></channel></rss>";

    fn headers(coding: &str) -> Headers {
        let mut h = Headers::new();
        h.append("Content-Encoding", coding);
        h
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn test_no_header_is_noop() {
        assert_eq!(decode_content(&Headers::new(), b"plain").unwrap(), None);
    }

    #[test]
    fn test_gzip() {
        let out = decode_content(&headers("gzip"), &gzip(FEED)).unwrap();
        assert_eq!(out.as_deref(), Some(FEED));
    }

    #[test]
    fn test_x_gzip_with_whitespace_and_case() {
        let out = decode_content(&headers(" X-GZIP\r\n"), &gzip(FEED)).unwrap();
        assert_eq!(out.as_deref(), Some(FEED));
    }

    #[test]
    fn test_gzip_output_is_trimmed() {
        let out = decode_content(&headers("gzip"), &gzip(b"\n  <feed/>\n\n")).unwrap();
        assert_eq!(out.as_deref(), Some(&b"<feed/>"[..]));
    }

    #[test]
    fn test_bad_gzip() {
        let err = decode_content(&headers("gzip"), b"not gzip at all").unwrap_err();
        assert!(matches!(err, FetchError::Decode { coding: "gzip" }));
    }

    #[test]
    fn test_deflate_raw() {
        let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
        enc.write_all(FEED).unwrap();
        let out = decode_content(&headers("deflate"), &enc.finish().unwrap()).unwrap();
        assert_eq!(out.as_deref(), Some(FEED));
    }

    #[test]
    fn test_deflate_zlib_wrapped() {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(FEED).unwrap();
        let out = decode_content(&headers("deflate"), &enc.finish().unwrap()).unwrap();
        assert_eq!(out.as_deref(), Some(FEED));
    }

    #[test]
    fn test_deflate_gzip_fallback() {
        let out = decode_content(&headers("deflate"), &gzip(FEED)).unwrap();
        assert_eq!(out.as_deref(), Some(FEED));
    }

    #[test]
    fn test_unknown_coding() {
        let err = decode_content(&headers("unsupported-token"), b"xyz").unwrap_err();
        assert_eq!(err.to_string(), "Unknown content coding: unsupported-token");
    }

    #[test]
    fn test_trim_body() {
        assert_eq!(trim_body(b" \r\n\0abc\x0b\t"), b"abc");
        assert_eq!(trim_body(b"   "), b"");
        assert_eq!(trim_body(b""), b"");
    }
}
