//! Internationalized host normalization.
//!
//! Converts a non-ASCII authority to its ASCII-compatible encoding
//! (UTS #46, non-transitional) before any request goes out. Anything that
//! cannot be converted passes through untouched.

use std::borrow::Cow;

use crate::uri::{compose_url, parse_url};

/// Normalize the authority of `url`.
///
/// The scheme, path and query are kept verbatim; a fragment is dropped when
/// the URL is rebuilt. Returns the input unchanged when IDNA support is
/// compiled out, the authority is already printable ASCII, or conversion
/// fails.
pub(crate) fn normalize_url(url: &str) -> Cow<'_, str> {
    let parts = parse_url(url);
    let Some(authority) = parts.authority else {
        return Cow::Borrowed(url);
    };
    if authority.is_empty() || is_printable_ascii(authority) {
        return Cow::Borrowed(url);
    }

    match authority_to_ascii(authority) {
        Some(ascii) => {
            tracing::debug!(from = authority, to = %ascii, "converted IDN authority");
            Cow::Owned(compose_url(
                parts.scheme,
                Some(&ascii),
                parts.path,
                parts.query,
                None,
            ))
        }
        None => Cow::Borrowed(url),
    }
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7e).contains(&b))
}

/// Convert the host part of `[userinfo@]host[:port]`, keeping userinfo and
/// port as written.
#[cfg(feature = "idn")]
fn authority_to_ascii(authority: &str) -> Option<String> {
    let (userinfo, host_port) = match authority.rfind('@') {
        Some(at) => (Some(&authority[..at]), &authority[at + 1..]),
        None => (None, authority),
    };
    let (host, port) = match host_port.rsplit_once(':') {
        Some((host, port)) if port.bytes().all(|b| b.is_ascii_digit()) => (host, Some(port)),
        _ => (host_port, None),
    };

    let ascii_host = match idna::domain_to_ascii(host) {
        Ok(h) if !h.is_empty() => h,
        Ok(_) => return None,
        Err(e) => {
            tracing::debug!(host, error = %e, "IDNA conversion failed");
            return None;
        }
    };

    let mut out = String::with_capacity(authority.len() + 16);
    if let Some(userinfo) = userinfo {
        out.push_str(userinfo);
        out.push('@');
    }
    out.push_str(&ascii_host);
    if let Some(port) = port {
        out.push(':');
        out.push_str(port);
    }
    Some(out)
}

#[cfg(not(feature = "idn"))]
fn authority_to_ascii(_authority: &str) -> Option<String> {
    None
}
