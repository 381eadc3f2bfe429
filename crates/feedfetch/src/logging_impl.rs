//! Logging helpers for feedfetch
//!
//! Fetch diagnostics go through `tracing`. Nothing here installs a
//! subscriber; that is the embedding application's job.
//!
//! # Log Levels
//!
//! - **WARN**: A fetch failed or a body could not be decoded
//! - **INFO**: Fetch completed
//! - **DEBUG**: Transport selection, each hop, redirect decisions
//! - **TRACE**: Raw header blocks
//!
//! # Security
//!
//! Feed URLs routinely carry `user:pass@` credentials and callers pass
//! `Authorization` or cookie headers. Both are redacted before they reach
//! a log line unless redaction is explicitly disabled.

use std::borrow::Cow;

/// Request headers whose values never appear in logs.
const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "proxy-authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
];

/// Configuration for logging behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether to redact credentials from logs (default: true)
    pub redact_sensitive: bool,

    /// Maximum length of logged values before truncation (default: 200)
    pub max_value_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            redact_sensitive: true,
            max_value_length: 200,
        }
    }
}

impl LogConfig {
    /// Create a new log configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable credential redaction (UNSAFE - use only for debugging)
    ///
    /// # Warning
    ///
    /// Passwords embedded in feed URLs will show up in logs.
    pub fn unsafe_disable_redaction(mut self) -> Self {
        self.redact_sensitive = false;
        self
    }

    /// Set maximum length for logged values
    pub fn max_value_length(mut self, len: usize) -> Self {
        self.max_value_length = len;
        self
    }

    /// Replace the userinfo of a URL with `[REDACTED]`.
    pub fn redact_url<'a>(&self, url: &'a str) -> Cow<'a, str> {
        if !self.redact_sensitive {
            return self.truncate(url);
        }

        if let Some(scheme_end) = url.find("://") {
            let rest = &url[scheme_end + 3..];
            let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
            if let Some(at_pos) = rest[..authority_end].rfind('@') {
                let scheme = &url[..scheme_end + 3];
                let host_part = &rest[at_pos + 1..];
                let redacted = format!("{scheme}[REDACTED]@{host_part}");
                return Cow::Owned(self.truncate(&redacted).into_owned());
            }
        }

        self.truncate(url)
    }

    /// Value of a request header as it may be logged.
    pub fn redact_header<'a>(&self, name: &str, value: &'a str) -> Cow<'a, str> {
        if self.redact_sensitive
            && SENSITIVE_HEADERS
                .iter()
                .any(|sensitive| name.eq_ignore_ascii_case(sensitive))
        {
            return Cow::Borrowed("[REDACTED]");
        }
        self.truncate(value)
    }

    /// Truncate value if it exceeds max length
    ///
    /// Handles UTF-8 char boundaries properly to avoid panics on multi-byte chars.
    fn truncate<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if value.len() <= self.max_value_length {
            Cow::Borrowed(value)
        } else {
            let mut end = self.max_value_length;
            while end > 0 && !value.is_char_boundary(end) {
                end -= 1;
            }
            Cow::Owned(format!(
                "{}...[truncated {} bytes]",
                &value[..end],
                value.len() - end
            ))
        }
    }
}

/// Escape control characters so a hostile header or body preview cannot
/// forge log lines.
pub fn sanitize_for_log(input: &str) -> String {
    input
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .chars()
        .filter(|c| !c.is_control() || *c == ' ')
        .collect()
}
