//! feedfetch CLI - Fetch a URL or local file and print it
//!
//! Usage:
//!   feedfetch https://example.com/feed.xml          # Print the body
//!   feedfetch -i https://example.com/feed.xml       # Status and headers too
//!   feedfetch --fallback http://example.com/rss     # Use the raw-socket client
//!   feedfetch ./feeds/local.xml                     # Read a local file

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use feedfetch::{DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT_SECS, FetchRequest, Fetcher};

/// feedfetch - Fetch feeds over HTTP(S) or from local storage
#[derive(Parser, Debug)]
#[command(name = "feedfetch")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL or local path to fetch
    url: String,

    /// Timeout in seconds for connect, write and each read
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Redirects to follow before stopping at the last response
    #[arg(long, default_value_t = DEFAULT_MAX_REDIRECTS)]
    max_redirects: u32,

    /// Use the raw-socket HTTP/1.1 client instead of the full client
    #[arg(long)]
    fallback: bool,

    /// Extra request header, as 'Name: value' (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// User-Agent to send (default: $FEEDFETCH_USER_AGENT or feedfetch/<version>)
    #[arg(short = 'A', long)]
    user_agent: Option<String>,

    /// Print status line and response headers before the body
    #[arg(short = 'i', long)]
    include: bool,
}

fn parse_header(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected 'Name: value', got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut request = FetchRequest::new(&args.url)
        .timeout(Duration::from_secs(args.timeout))
        .max_redirects(args.max_redirects)
        .force_fallback(args.fallback)
        .headers(args.headers);
    if let Some(ua) = args.user_agent {
        request = request.user_agent(ua);
    }

    let result = Fetcher::from_env().fetch(&request);

    let mut stdout = std::io::stdout().lock();
    if args.include && result.status_code() != 0 {
        write!(stdout, "HTTP {}\r\n{}\r\n", result.status_code(), result.headers())
            .context("Failed to write headers")?;
    }
    stdout
        .write_all(result.body())
        .and_then(|()| stdout.flush())
        .context("Failed to write body")?;

    if result.permanent_url() != result.final_url() {
        eprintln!("feedfetch: permanent URL is {}", result.permanent_url());
    }
    if let Some(error) = result.error() {
        bail!("{}: {error}", result.final_url());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Accept:  application/rss+xml ").unwrap(),
            ("Accept".to_string(), "application/rss+xml".to_string())
        );
        assert_eq!(
            parse_header("X-Time: 12:30").unwrap(),
            ("X-Time".to_string(), "12:30".to_string())
        );
        assert!(parse_header("no-colon").is_err());
        assert!(parse_header(": value").is_err());
    }

    #[test]
    fn test_args() {
        let args = Args::try_parse_from([
            "feedfetch",
            "--fallback",
            "-H",
            "Accept: text/xml",
            "--max-redirects",
            "2",
            "http://example.com/",
        ])
        .unwrap();
        assert!(args.fallback);
        assert_eq!(args.max_redirects, 2);
        assert_eq!(args.timeout, DEFAULT_TIMEOUT_SECS);
        assert_eq!(args.headers, vec![("Accept".into(), "text/xml".into())]);
    }
}
