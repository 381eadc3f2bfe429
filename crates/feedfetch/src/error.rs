//! Error types for feedfetch
//!
//! Every failure of a fetch is reported as a value on
//! [`FetchResult`](crate::FetchResult), never as a panic or an early return
//! across the fetch boundary. This module provides the categories:
//! - Human-readable messages suitable for logs and end users
//! - No credentials from the requested URL in any message
//! - Clear categorization for programmatic handling

use std::time::Duration;

use thiserror::Error;

/// Result type alias using feedfetch's Error.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Reasons a fetch can fail.
///
/// Reaching the redirect limit is deliberately absent: the chain stops at the
/// last response and that response is returned as a success.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The URL could not be split into the parts a transport needs.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Socket could not be opened (resolution, refusal, unreachable host).
    #[error("connection failed: {0}")]
    Connect(String),

    /// No complete response arrived within the configured timeout.
    #[error("operation timed out after {after:?}")]
    Timeout { after: Duration },

    /// TLS handshake or session failure on the raw-socket transport.
    #[error("tls error: {0}")]
    Tls(String),

    /// Error reported by the full-featured HTTP client binding.
    ///
    /// `class` names what went wrong (`connect`, `timeout`, `decode`, ...),
    /// the message is the binding's own.
    #[error("http client error [{class}]: {message}")]
    Client { class: &'static str, message: String },

    /// The raw response could not be parsed as an HTTP message.
    #[error("malformed HTTP response: {0}")]
    Protocol(String),

    /// A gzip or deflate body could not be inflated.
    #[error("Unable to decode HTTP \"{coding}\" stream")]
    Decode { coding: &'static str },

    /// The response used a content coding this crate does not implement.
    #[error("Unknown content coding: {0}")]
    UnknownContentCoding(String),

    /// A local resource was missing, unreadable or empty.
    #[error("could not read local file: {0}")]
    LocalRead(String),
}

impl FetchError {
    /// Build a [`FetchError::Client`] from a class tag and message.
    pub fn client(class: &'static str, message: impl Into<String>) -> Self {
        Self::Client {
            class,
            message: message.into(),
        }
    }

    /// Whether the failure happened before any HTTP response was obtained.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl(_)
                | Self::Connect(_)
                | Self::Timeout { .. }
                | Self::Tls(_)
                | Self::Client { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            FetchError::Decode { coding: "gzip" }.to_string(),
            "Unable to decode HTTP \"gzip\" stream"
        );
        assert_eq!(
            FetchError::UnknownContentCoding("br".into()).to_string(),
            "Unknown content coding: br"
        );
        assert_eq!(
            FetchError::client("connect", "refused").to_string(),
            "http client error [connect]: refused"
        );
        assert_eq!(
            FetchError::Timeout {
                after: Duration::from_secs(3)
            }
            .to_string(),
            "operation timed out after 3s"
        );
    }

    #[test]
    fn test_is_transport() {
        assert!(FetchError::Connect("refused".into()).is_transport());
        assert!(
            FetchError::Timeout {
                after: Duration::from_millis(500)
            }
            .is_transport()
        );
        assert!(!FetchError::Protocol("bad status line".into()).is_transport());
        assert!(!FetchError::LocalRead("missing".into()).is_transport());
    }
}
