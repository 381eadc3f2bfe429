//! Fetch request description.

use std::time::Duration;

/// Default per-request timeout (10 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default number of redirects followed before the chain is frozen
pub const DEFAULT_MAX_REDIRECTS: u32 = 5;

/// Low-level settings for the full-featured HTTP transport.
///
/// Applied after everything the adapter configures itself, in the order
/// given, so each one overrides the adapter's own choice. The socket and
/// local transports ignore them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportOption {
    /// Let the client follow up to this many redirects on its own.
    /// The final URL it lands on becomes the hop's observed URL.
    FollowRedirects(usize),
    /// Overall request timeout.
    Timeout(Duration),
    /// Connection establishment timeout.
    ConnectTimeout(Duration),
    /// Toggle gzip negotiation and transparent decoding.
    Gzip(bool),
    /// Toggle deflate negotiation and transparent decoding.
    Deflate(bool),
    /// Route requests through this proxy URL.
    Proxy(String),
    /// Accept TLS certificates that fail verification.
    AcceptInvalidCerts(bool),
    /// Set a request header, replacing any value the adapter chose.
    Header(String, String),
}

/// What to fetch and how.
///
/// Built once, then read by every hop of the redirect chain without being
/// modified.
///
/// # Example
///
/// ```rust
/// use feedfetch::FetchRequest;
/// use std::time::Duration;
///
/// let request = FetchRequest::new("https://example.com/feed.xml")
///     .timeout(Duration::from_secs(5))
///     .max_redirects(3)
///     .header("Accept", "application/atom+xml");
/// assert_eq!(request.max_redirects_allowed(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    url: String,
    timeout: Duration,
    max_redirects: u32,
    headers: Vec<(String, String)>,
    user_agent: Option<String>,
    force_fallback: bool,
    transport_options: Vec<TransportOption>,
}

impl FetchRequest {
    /// Request `url` with default settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            headers: Vec::new(),
            user_agent: None,
            force_fallback: false,
            transport_options: Vec::new(),
        }
    }

    /// Bound for connect, write and each read.
    ///
    /// On the raw-socket path, host name resolution runs before the
    /// connect and is left to the system resolver's own limits; the
    /// timeout applies per resolved address from there on.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Redirects to follow before freezing the chain at the last response.
    pub fn max_redirects(mut self, count: u32) -> Self {
        self.max_redirects = count;
        self
    }

    /// Add a header sent verbatim with every hop.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add several headers.
    pub fn headers<N, V>(mut self, headers: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(n, v)| (n.into(), v.into())));
        self
    }

    /// Override the configured default user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Always use the raw-socket transport for remote URLs.
    pub fn force_fallback(mut self, force: bool) -> Self {
        self.force_fallback = force;
        self
    }

    /// Append a low-level option for the full-featured transport.
    pub fn transport_option(mut self, option: TransportOption) -> Self {
        self.transport_options.push(option);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout_duration(&self) -> Duration {
        self.timeout
    }

    pub fn max_redirects_allowed(&self) -> u32 {
        self.max_redirects
    }

    pub fn extra_headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn user_agent_override(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn is_fallback_forced(&self) -> bool {
        self.force_fallback
    }

    pub fn transport_options(&self) -> &[TransportOption] {
        &self.transport_options
    }
}
