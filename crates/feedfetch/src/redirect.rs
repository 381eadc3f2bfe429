//! Redirect chasing shared by every remote transport.
//!
//! The fetch loop owns one [`RedirectChain`] per logical fetch. Each hop
//! reports the URL it is about to request with [`RedirectChain::enter`]
//! and then asks [`RedirectChain::follow`] whether the response it got
//! leads somewhere else.

use crate::error::Result;
use crate::headers::Headers;
use crate::uri::absolutize;

/// Status codes that may carry a `Location` worth following.
pub(crate) fn is_redirect_status(status: u16) -> bool {
    matches!(status, 300 | 301 | 302 | 303 | 307) || (308..400).contains(&status)
}

/// Redirects after which a client should remember the new location.
pub(crate) fn is_permanent(status: u16) -> bool {
    matches!(status, 301 | 308)
}

/// Loop state of one redirect chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RedirectChain {
    max: u32,
    used: u32,
    /// Still inside the leading run of permanent redirects.
    advancing: bool,
    permanent_url: String,
}

impl RedirectChain {
    pub(crate) fn new(max: u32) -> Self {
        Self {
            max,
            used: 0,
            advancing: true,
            permanent_url: String::new(),
        }
    }

    /// Record the (normalized) URL of the hop about to be requested.
    pub(crate) fn enter(&mut self, url: &str) {
        if self.advancing {
            self.permanent_url = url.to_string();
        }
    }

    /// Decide whether a response redirects. Returns the absolute target
    /// when it does, after counting the hop.
    ///
    /// A redirect status without `Location`, or one arriving after the
    /// limit is spent, ends the chain at that response.
    pub(crate) fn follow(
        &mut self,
        status: u16,
        headers: &Headers,
        current_url: &str,
    ) -> Result<Option<String>> {
        if !is_redirect_status(status) || self.used >= self.max {
            return Ok(None);
        }
        let Some(location) = headers.raw("location").and_then(|v| v.first()) else {
            return Ok(None);
        };

        let target = absolutize(location.trim(), current_url)?;
        self.used += 1;
        self.advancing = self.advancing && is_permanent(status);
        tracing::debug!(
            status,
            hop = self.used,
            permanent = self.advancing,
            "following redirect"
        );
        Ok(Some(target))
    }

    pub(crate) fn redirects_used(&self) -> u32 {
        self.used
    }

    pub(crate) fn permanent_url(&self) -> &str {
        &self.permanent_url
    }
}
