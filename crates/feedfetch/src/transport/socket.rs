//! Raw-socket HTTP/1.1 transport.
//!
//! Writes a hand-built `GET` over a plain or TLS stream, reads until the
//! peer closes, and hands the buffer to the message parser. Used when the
//! full-featured client is compiled out or the caller forces it.

use std::fmt::Write as _;
use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};

use super::{Exchange, Hop, Transport, TransportKind};
use crate::error::{FetchError, Result};
use crate::message::parse_response;
use crate::uri::{Authority, parse_url};

/// Read buffer size for the response loop.
const READ_CHUNK: usize = 8 * 1024;

/// Codings offered to servers; all are handled by [`crate::decode`].
const ACCEPT_ENCODING: &str = "x-gzip,gzip,deflate";

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SocketTransport;

/// Where and what to request, split out of the hop URL.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    tls: bool,
    host: String,
    port: u16,
    /// `Host` header value.
    host_header: String,
    /// Request target: path plus query, `/` when empty.
    request_target: String,
    credentials: Option<(String, String)>,
}

impl Target {
    fn parse(url: &str) -> Result<Self> {
        let parts = parse_url(url);
        let tls = match parts.scheme {
            Some(s) if s.eq_ignore_ascii_case("https") => true,
            Some(s) if s.eq_ignore_ascii_case("http") => false,
            _ => return Err(FetchError::InvalidUrl(format!("not an http(s) URL: {url}"))),
        };
        let authority = Authority::parse(parts.authority.unwrap_or(""))?;
        let default_port = if tls { 443 } else { 80 };
        let port = authority.port.unwrap_or(default_port);

        let host_header = if port == default_port {
            authority.host.to_string()
        } else {
            format!("{}:{}", authority.host, port)
        };

        let request_target = match (parts.path, parts.query) {
            ("", None) => "/".to_string(),
            ("", Some(q)) => format!("/?{q}"),
            (p, None) => p.to_string(),
            (p, Some(q)) => format!("{p}?{q}"),
        };

        Ok(Self {
            tls,
            host: authority.bare_host().to_string(),
            port,
            host_header,
            request_target,
            credentials: authority
                .credentials()
                .map(|(u, p)| (u.to_string(), p.to_string())),
        })
    }
}

/// Serialize the request head.
fn build_request(target: &Target, hop: &Hop<'_>) -> String {
    let mut out = String::with_capacity(256);
    let _ = write!(out, "GET {} HTTP/1.1\r\n", target.request_target);
    let _ = write!(out, "Host: {}\r\n", target.host_header);
    let _ = write!(out, "User-Agent: {}\r\n", hop.user_agent);
    let _ = write!(out, "Accept-Encoding: {ACCEPT_ENCODING}\r\n");
    if let Some((user, pass)) = &target.credentials {
        let token = base64::engine::general_purpose::STANDARD.encode(format!("{user}:{pass}"));
        let _ = write!(out, "Authorization: Basic {token}\r\n");
    }
    for (name, value) in hop.request.extra_headers() {
        let _ = write!(out, "{name}: {value}\r\n");
    }
    out.push_str("Connection: Close\r\n\r\n");
    out
}

/// An open connection, plain or TLS.
enum Connection {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

impl Connection {
    fn open(target: &Target, timeout: Duration) -> Result<Self> {
        let tcp = connect(&target.host, target.port, timeout)?;
        tcp.set_read_timeout(Some(timeout))
            .and_then(|()| tcp.set_write_timeout(Some(timeout)))
            .map_err(|e| FetchError::Connect(format!("cannot set socket timeout: {e}")))?;

        if !target.tls {
            return Ok(Self::Plain(tcp));
        }

        let server_name = ServerName::try_from(target.host.clone())
            .map_err(|e| FetchError::Tls(format!("invalid server name {}: {e}", target.host)))?;
        let session = ClientConnection::new(tls_config()?, server_name)
            .map_err(|e| FetchError::Tls(e.to_string()))?;
        Ok(Self::Tls(Box::new(StreamOwned::new(session, tcp))))
    }

    fn socket(&self) -> &TcpStream {
        match self {
            Self::Plain(tcp) => tcp,
            Self::Tls(stream) => &stream.sock,
        }
    }

    /// Send TLS close_notify where applicable and shut the socket down.
    fn close(mut self) {
        if let Self::Tls(stream) = &mut self {
            stream.conn.send_close_notify();
            let _ = stream.flush();
        }
        let _ = self.socket().shutdown(Shutdown::Both);
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(tcp) => tcp.read(buf),
            Self::Tls(stream) => stream.read(buf),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(tcp) => tcp.write(buf),
            Self::Tls(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(tcp) => tcp.flush(),
            Self::Tls(stream) => stream.flush(),
        }
    }
}

/// Try every resolved address in turn, each bounded by `timeout`.
///
/// Resolution itself is a blocking system lookup outside that bound.
fn connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|e| FetchError::Connect(format!("cannot resolve {host}: {e}")))?
        .collect();

    let mut last_err = None;
    for addr in &addrs {
        match TcpStream::connect_timeout(addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }
    Err(match last_err {
        Some(e) if is_timeout(&e) => FetchError::Connect(format!(
            "connection to {host}:{port} timed out"
        )),
        Some(e) => FetchError::Connect(format!("{host}:{port}: {e}")),
        None => FetchError::Connect(format!("no addresses found for {host}")),
    })
}

fn tls_config() -> Result<Arc<ClientConfig>> {
    let roots = RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let config = ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| FetchError::Tls(e.to_string()))?
    .with_root_certificates(roots)
    .with_no_client_auth();
    Ok(Arc::new(config))
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

/// Write the request and read the whole response.
fn send_and_read(conn: &mut Connection, request: &str, timeout: Duration) -> Result<Vec<u8>> {
    let timed_out = || FetchError::Timeout { after: timeout };

    conn.write_all(request.as_bytes())
        .and_then(|()| conn.flush())
        .map_err(|e| match e {
            e if is_timeout(&e) => timed_out(),
            e if e.kind() == ErrorKind::InvalidData => FetchError::Tls(e.to_string()),
            e => FetchError::Connect(format!("write failed: {e}")),
        })?;

    let mut raw = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        match conn.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => raw.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if is_timeout(&e) => return Err(timed_out()),
            // Peers that close TLS without close_notify.
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(FetchError::Tls(e.to_string()));
            }
            Err(e) => return Err(FetchError::Connect(format!("read failed: {e}"))),
        }
    }
    Ok(raw)
}

impl Transport for SocketTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::RemoteSocketFallback
    }

    fn exchange(&self, hop: &Hop<'_>) -> Result<Exchange> {
        let target = Target::parse(hop.url)?;
        let timeout = hop.request.timeout_duration();
        let request = build_request(&target, hop);

        let mut conn = Connection::open(&target, timeout)?;
        let raw = send_and_read(&mut conn, &request, timeout);
        conn.close();
        let raw = raw?;

        tracing::debug!(bytes = raw.len(), tls = target.tls, "socket response read");
        let message = parse_response(&raw, 0)?;
        Ok(Exchange {
            url: hop.url.to_string(),
            status: message.status,
            headers: message.headers,
            body: message.body,
        })
    }

    fn leaves_body_encoded(&self) -> bool {
        true
    }
}
