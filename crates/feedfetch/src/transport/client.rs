//! Full-featured HTTP transport backed by reqwest.
//!
//! A fresh blocking client is configured for every exchange: connections
//! are never reused across fetches, and each hop may carry different
//! timeouts or options.
//!
//! # Behavior
//!
//! - Redirects are not followed by the client; [`crate::redirect`] decides.
//!   `TransportOption::FollowRedirects` opts back in.
//! - 4xx/5xx are ordinary responses, not errors.
//! - gzip/deflate are negotiated and decoded by the client. A body that
//!   fails to decode is fetched once more with negotiation disabled.

use std::error::Error as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;

use super::{Exchange, Hop, Transport, TransportKind};
use crate::decode::trim_body;
use crate::error::{FetchError, Result};
use crate::headers::{HeaderValue, Headers};
use crate::request::TransportOption;
use crate::uri::strip_credentials;

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ClientTransport;

impl ClientTransport {
    /// One request/response round trip.
    fn attempt(
        &self,
        hop: &Hop<'_>,
        negotiate_encoding: bool,
    ) -> std::result::Result<Exchange, reqwest::Error> {
        let redirects = Arc::new(AtomicUsize::new(0));
        let client = build_client(hop, negotiate_encoding, &redirects)?;

        let mut request = client.get(hop.url);
        for (name, value) in request_headers(hop) {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send()?;
        let url = response.url().to_string();
        let status = response.status().as_u16();
        let headers = convert_headers(response.headers());
        let body = response.bytes()?;

        tracing::debug!(
            status,
            followed = redirects.load(Ordering::Relaxed),
            bytes = body.len(),
            "http client response"
        );

        Ok(Exchange {
            url,
            status,
            headers,
            body: trim_body(&body).to_vec(),
        })
    }
}

impl Transport for ClientTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::RemoteRichClient
    }

    fn exchange(&self, hop: &Hop<'_>) -> Result<Exchange> {
        let result = match self.attempt(hop, true) {
            Err(e) if e.is_decode() => {
                tracing::debug!(error = %e, "content decoding failed, retrying without negotiation");
                self.attempt(hop, false)
            }
            other => other,
        };
        result.map_err(into_fetch_error)
    }
}

/// Configure a client for `hop`. Caller options come last and win, except
/// that a retry with `negotiate_encoding == false` always disables
/// compression.
fn build_client(
    hop: &Hop<'_>,
    negotiate_encoding: bool,
    redirects: &Arc<AtomicUsize>,
) -> std::result::Result<Client, reqwest::Error> {
    install_crypto_provider();

    let timeout = hop.request.timeout_duration();
    let mut builder = Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::none())
        .gzip(true)
        .deflate(true)
        .user_agent(hop.user_agent);

    for option in hop.request.transport_options() {
        builder = apply_option(builder, option, redirects)?;
    }

    if !negotiate_encoding {
        builder = builder.gzip(false).deflate(false);
    }
    builder.build()
}

fn apply_option(
    builder: ClientBuilder,
    option: &TransportOption,
    redirects: &Arc<AtomicUsize>,
) -> std::result::Result<ClientBuilder, reqwest::Error> {
    Ok(match option {
        TransportOption::FollowRedirects(max) => {
            let max = *max;
            let counter = Arc::clone(redirects);
            builder.redirect(Policy::custom(move |attempt| {
                let followed = attempt.previous().len();
                if followed > max {
                    attempt.stop()
                } else {
                    counter.store(followed, Ordering::Relaxed);
                    attempt.follow()
                }
            }))
        }
        TransportOption::Timeout(t) => builder.timeout(*t),
        TransportOption::ConnectTimeout(t) => builder.connect_timeout(*t),
        TransportOption::Gzip(on) => builder.gzip(*on),
        TransportOption::Deflate(on) => builder.deflate(*on),
        TransportOption::Proxy(url) => builder.proxy(reqwest::Proxy::all(url.as_str())?),
        TransportOption::AcceptInvalidCerts(on) => builder.danger_accept_invalid_certs(*on),
        // Request-level; handled in `request_headers`.
        TransportOption::Header(..) => builder,
    })
}

/// Referer, caller headers, then `TransportOption::Header` overrides.
fn request_headers(hop: &Hop<'_>) -> Vec<(String, String)> {
    let mut headers = vec![("Referer".to_string(), strip_credentials(hop.url))];
    headers.extend(hop.request.extra_headers().iter().cloned());

    for option in hop.request.transport_options() {
        if let TransportOption::Header(name, value) = option {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }
    }
    headers
}

fn convert_headers(map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for name in map.keys() {
        let values: Vec<String> = map
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();
        let value = match <[String; 1]>::try_from(values) {
            Ok([single]) => HeaderValue::Scalar(single),
            Err(values) => HeaderValue::List(values),
        };
        headers.insert(name.as_str(), value);
    }
    headers
}

/// reqwest is built with `rustls-no-provider`; make sure one is installed.
fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

fn into_fetch_error(e: reqwest::Error) -> FetchError {
    let class = if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect"
    } else if e.is_redirect() {
        "redirect"
    } else if e.is_decode() {
        "decode"
    } else if e.is_body() {
        "body"
    } else if e.is_builder() {
        "builder"
    } else if e.is_request() {
        "request"
    } else {
        "other"
    };

    // Drop the URL from the message: it may carry credentials.
    let e = e.without_url();
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    tracing::warn!(class, error = %message, "http client failure");
    FetchError::client(class, message)
}
