//! Local storage reads.

use std::path::PathBuf;

use url::Url;

use super::{Exchange, Hop, Transport, TransportKind};
use crate::decode::trim_body;
use crate::error::{FetchError, Result};
use crate::headers::Headers;

/// Reads a filesystem path (or `file://` URL) whole into the body.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LocalTransport;

impl LocalTransport {
    fn path_for(target: &str) -> Result<PathBuf> {
        if target.is_empty() {
            return Err(FetchError::LocalRead("empty path".into()));
        }
        if target
            .get(..7)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("file://"))
        {
            return Url::parse(target)
                .ok()
                .and_then(|u| u.to_file_path().ok())
                .ok_or_else(|| FetchError::LocalRead(format!("not a local file URL: {target}")));
        }
        Ok(PathBuf::from(target))
    }
}

impl Transport for LocalTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Local
    }

    fn exchange(&self, hop: &Hop<'_>) -> Result<Exchange> {
        let path = Self::path_for(hop.url)?;
        let data = std::fs::read(&path)
            .map_err(|e| FetchError::LocalRead(format!("{}: {}", path.display(), e)))?;
        let body = trim_body(&data);
        if body.is_empty() {
            return Err(FetchError::LocalRead(format!("{}: empty file", path.display())));
        }
        tracing::debug!(path = %path.display(), bytes = body.len(), "read local resource");

        Ok(Exchange {
            url: hop.url.to_string(),
            status: 0,
            headers: Headers::new(),
            body: body.to_vec(),
        })
    }
}
