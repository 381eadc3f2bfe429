//! The result of one logical fetch.

use std::borrow::Cow;

use crate::error::FetchError;
use crate::headers::Headers;
use crate::transport::TransportKind;

/// Everything a fetch produced, whichever transport produced it.
///
/// A failed fetch still carries whatever was obtained before the failure:
/// a body that could not be decoded is kept as received, together with its
/// status and headers.
#[derive(Debug)]
pub struct FetchResult {
    pub(crate) final_url: String,
    pub(crate) permanent_url: String,
    pub(crate) status_code: u16,
    pub(crate) headers: Headers,
    pub(crate) body: Vec<u8>,
    pub(crate) error: Option<FetchError>,
    pub(crate) redirect_count: u32,
    pub(crate) transport: TransportKind,
}

impl FetchResult {
    /// A result that failed before anything was obtained.
    pub(crate) fn failed(
        url: impl Into<String>,
        permanent_url: impl Into<String>,
        transport: TransportKind,
        error: FetchError,
    ) -> Self {
        Self {
            final_url: url.into(),
            permanent_url: permanent_url.into(),
            status_code: 0,
            headers: Headers::new(),
            body: Vec::new(),
            error: Some(error),
            redirect_count: 0,
            transport,
        }
    }

    /// URL reached through the leading run of 301/308 redirects.
    ///
    /// This is the location a feed reader should store in place of the one
    /// it asked for.
    pub fn permanent_url(&self) -> &str {
        &self.permanent_url
    }

    /// Last URL actually requested.
    pub fn final_url(&self) -> &str {
        &self.final_url
    }

    /// HTTP status of the last response; 0 when there was none.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Values of header `name` (case-insensitive); empty when absent.
    pub fn header(&self, name: &str) -> Vec<String> {
        self.headers.get(name)
    }

    /// Values of header `name` joined with `", "`.
    pub fn header_line(&self, name: &str) -> String {
        self.headers.get_line(name)
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains(name)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text, with invalid UTF-8 replaced.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Consume the result, keeping only the body.
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Whether the fetch completed without error. Any HTTP status counts,
    /// 404 included.
    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    /// Redirects followed by the redirect controller.
    pub fn redirect_count(&self) -> u32 {
        self.redirect_count
    }

    pub fn transport(&self) -> TransportKind {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result() {
        let result = FetchResult::failed(
            "http://a.test/",
            "http://a.test/",
            TransportKind::RemoteSocketFallback,
            FetchError::Connect("refused".into()),
        );
        assert!(!result.success());
        assert_eq!(result.status_code(), 0);
        assert!(result.body().is_empty());
        assert!(result.header("content-type").is_empty());
        assert_eq!(result.header_line("content-type"), "");
        assert!(!result.has_header("content-type"));
        assert_eq!(
            result.error().map(ToString::to_string).as_deref(),
            Some("connection failed: refused")
        );
    }

    #[test]
    fn test_header_access() {
        let mut headers = Headers::new();
        headers.append("Content-Type", "text/xml");
        headers.append("Vary", "Accept, Cookie");
        let result = FetchResult {
            final_url: "http://a.test/".into(),
            permanent_url: "http://a.test/".into(),
            status_code: 200,
            headers,
            body: b"<rss/>".to_vec(),
            error: None,
            redirect_count: 0,
            transport: TransportKind::RemoteRichClient,
        };
        assert!(result.success());
        assert_eq!(result.header("CONTENT-TYPE"), vec!["text/xml".to_string()]);
        assert_eq!(
            result.header("vary"),
            vec!["Accept".to_string(), "Cookie".to_string()]
        );
        assert_eq!(result.header_line("Vary"), "Accept, Cookie");
        assert!(result.has_header("content-type"));
        assert_eq!(result.body_text(), "<rss/>");
        assert_eq!(result.into_body(), b"<rss/>");
    }
}
