//! feedfetch - Fetch a feed over HTTP(S) or from local storage
//!
//! One call resolves a URL to a status, headers and body, whichever way it
//! was retrieved:
//!
//! - `http://` and `https://` URLs go through a full-featured HTTP client
//!   (reqwest, feature `http_client`), or through a hand-built HTTP/1.1
//!   client over a raw socket when the caller forces it or the feature is
//!   off.
//! - Anything else is read from the filesystem.
//!
//! Redirects are followed up to a limit, tracking the URL reached through
//! permanent (301/308) redirects separately from the final one. Hosts with
//! non-ASCII names are converted to their ASCII form first (feature
//! `idn`), and compressed bodies are decoded.
//!
//! # Example
//!
//! ```rust,no_run
//! use feedfetch::{FetchRequest, Fetcher};
//! use std::time::Duration;
//!
//! let fetcher = Fetcher::from_env();
//! let request = FetchRequest::new("https://example.com/feed.xml")
//!     .timeout(Duration::from_secs(5))
//!     .header("Accept", "application/rss+xml");
//! let result = fetcher.fetch(&request);
//!
//! match result.error() {
//!     None => println!("{} {}", result.status_code(), result.body_text()),
//!     Some(e) => eprintln!("fetch failed: {e}"),
//! }
//! // Store this instead of the requested URL.
//! println!("{}", result.permanent_url());
//! ```
//!
//! # Logging
//!
//! Diagnostics are emitted with `tracing`; install a subscriber to see
//! them. URL credentials and sensitive headers are redacted, see
//! [`LogConfig`].

mod config;
mod decode;
mod error;
mod fetch;
mod headers;
mod logging_impl;
mod message;
mod normalize;
mod redirect;
mod request;
mod response;
mod transport;
mod uri;

pub use config::{FetchConfig, USER_AGENT_ENV};
pub use error::{FetchError, Result};
pub use fetch::Fetcher;
pub use headers::{HeaderValue, Headers};
pub use logging_impl::{LogConfig, sanitize_for_log};
pub use request::{DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT_SECS, FetchRequest, TransportOption};
pub use response::FetchResult;
pub use transport::TransportKind;
