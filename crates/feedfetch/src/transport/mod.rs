//! Transports: one physical exchange each.
//!
//! A transport takes a single URL and produces a parsed response or an
//! error. Redirect handling and content decoding live above this layer in
//! [`crate::fetch`], so every transport behaves the same way there.

#[cfg(feature = "http_client")]
mod client;
mod local;
mod socket;

#[cfg(feature = "http_client")]
pub(crate) use client::ClientTransport;
pub(crate) use local::LocalTransport;
pub(crate) use socket::SocketTransport;

use std::fmt;

use crate::error::Result;
use crate::headers::Headers;
use crate::request::FetchRequest;

/// Which strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// Read from local storage.
    Local,
    /// Remote, through the full-featured HTTP client binding.
    RemoteRichClient,
    /// Remote, through the hand-built HTTP/1.1 socket client.
    RemoteSocketFallback,
}

impl TransportKind {
    pub fn is_remote(self) -> bool {
        !matches!(self, Self::Local)
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::RemoteRichClient => "http-client",
            Self::RemoteSocketFallback => "socket",
        })
    }
}

/// Everything a transport needs for one physical request.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Hop<'a> {
    /// Normalized target of this hop.
    pub url: &'a str,
    pub request: &'a FetchRequest,
    /// Caller's user agent, or the configured default.
    pub user_agent: &'a str,
}

/// Result of one physical exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Exchange {
    /// URL the transport actually reached.
    pub url: String,
    /// 0 when no HTTP response exists (local reads).
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

/// One way of performing a physical exchange.
pub(crate) trait Transport: Send + Sync {
    fn kind(&self) -> TransportKind;

    fn exchange(&self, hop: &Hop<'_>) -> Result<Exchange>;

    /// Whether bodies come back with their content coding still applied.
    fn leaves_body_encoded(&self) -> bool {
        false
    }
}
