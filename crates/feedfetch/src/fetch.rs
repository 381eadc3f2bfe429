//! The fetch loop: normalize, pick a transport, exchange, follow redirects,
//! decode.

use crate::config::FetchConfig;
use crate::decode::{decode_content, trim_body};
use crate::logging_impl::sanitize_for_log;
use crate::normalize::normalize_url;
use crate::redirect::RedirectChain;
use crate::request::FetchRequest;
use crate::response::FetchResult;
use crate::transport::{Hop, LocalTransport, SocketTransport, Transport};
use crate::uri::is_remote;

static LOCAL: LocalTransport = LocalTransport;
static SOCKET: SocketTransport = SocketTransport;
#[cfg(feature = "http_client")]
static CLIENT: crate::transport::ClientTransport = crate::transport::ClientTransport;

/// Performs fetches.
///
/// Holds only configuration; every call to [`fetch`](Fetcher::fetch) owns
/// its connections and buffers from start to finish, so one `Fetcher` can
/// be shared freely between threads.
///
/// # Example
///
/// ```rust,no_run
/// use feedfetch::{FetchRequest, Fetcher};
///
/// let fetcher = Fetcher::from_env();
/// let result = fetcher.fetch(&FetchRequest::new("https://example.com/feed.xml"));
/// if result.success() {
///     println!("{} bytes from {}", result.body().len(), result.final_url());
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Fetcher {
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    /// A fetcher configured from the environment. See [`FetchConfig::from_env`].
    pub fn from_env() -> Self {
        Self::new(FetchConfig::from_env())
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch `request.url()`, following redirects.
    ///
    /// Never panics and never returns early with an error: failures are
    /// reported through [`FetchResult::error`].
    pub fn fetch(&self, request: &FetchRequest) -> FetchResult {
        self.run(request, |url| select_transport(url, request))
    }

    fn run<'t>(
        &self,
        request: &FetchRequest,
        select: impl Fn(&str) -> &'t dyn Transport,
    ) -> FetchResult {
        let log = &self.config.log;
        let user_agent = request
            .user_agent_override()
            .unwrap_or(&self.config.default_user_agent);
        for (name, value) in request.extra_headers() {
            tracing::trace!(%name, value = %log.redact_header(name, value), "request header");
        }

        let mut chain = RedirectChain::new(request.max_redirects_allowed());
        let mut url = request.url().to_string();

        loop {
            let hop_url = normalize_url(&url).into_owned();
            chain.enter(&hop_url);

            let transport = select(&hop_url);
            let kind = transport.kind();
            tracing::debug!(
                url = %log.redact_url(&hop_url),
                transport = %kind,
                hop = chain.redirects_used(),
                "requesting"
            );

            let hop = Hop {
                url: &hop_url,
                request,
                user_agent,
            };
            let exchange = match transport.exchange(&hop) {
                Ok(exchange) => exchange,
                Err(error) => {
                    tracing::warn!(url = %log.redact_url(&hop_url), %error, "fetch failed");
                    let mut result =
                        FetchResult::failed(hop_url.as_str(), chain.permanent_url(), kind, error);
                    result.redirect_count = chain.redirects_used();
                    return result;
                }
            };
            tracing::trace!(
                status = exchange.status,
                headers = %sanitize_for_log(&exchange.headers.to_string()),
                "response headers"
            );

            let mut error = None;
            if kind.is_remote() {
                match chain.follow(exchange.status, &exchange.headers, &hop_url) {
                    Ok(Some(next)) => {
                        url = next;
                        continue;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(%e, "unusable redirect target");
                        error = Some(e);
                    }
                }
            }

            let mut body = exchange.body;
            if error.is_none() && transport.leaves_body_encoded() {
                match decode_content(&exchange.headers, &body) {
                    Ok(Some(decoded)) => body = decoded,
                    // Only identity bodies: a gzip trailer may end in NUL.
                    Ok(None) => body = trim_body(&body).to_vec(),
                    Err(e) => {
                        tracing::warn!(%e, "body left encoded");
                        error = Some(e);
                    }
                }
            }

            tracing::info!(
                status = exchange.status,
                redirects = chain.redirects_used(),
                transport = %kind,
                bytes = body.len(),
                "fetch complete"
            );
            return FetchResult {
                final_url: exchange.url,
                permanent_url: chain.permanent_url().to_string(),
                status_code: exchange.status,
                headers: exchange.headers,
                body,
                error,
                redirect_count: chain.redirects_used(),
                transport: kind,
            };
        }
    }
}

/// Local unless the URL is http(s); remote URLs use the rich client unless
/// the caller forces the socket path or the client is compiled out.
fn select_transport(url: &str, request: &FetchRequest) -> &'static dyn Transport {
    if !is_remote(url) {
        return &LOCAL;
    }
    if request.is_fallback_forced() {
        return &SOCKET;
    }
    rich_client()
}

#[cfg(feature = "http_client")]
fn rich_client() -> &'static dyn Transport {
    &CLIENT
}

#[cfg(not(feature = "http_client"))]
fn rich_client() -> &'static dyn Transport {
    &SOCKET
}
