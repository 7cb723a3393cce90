//! Thin HTTP layer shared by the board fetcher and the search walker.
//!
//! One shared client per run, explicit status checks and a hard per-request
//! timeout so a stalled origin never hangs the whole crawl.
use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION};
use reqwest::{Client, Response};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::error::{FetchError, SnagError};
use super::USER_AGENT;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the shared client every request in a run goes through.
pub fn client() -> Result<Client, FetchError> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    Ok(client)
}

/// Fetches a page and returns its body as text.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, FetchError> {
    debug!("GET {}", url);
    let res = client.get(url).send().await?;

    let status = res.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let body = res.bytes().await?;
    String::from_utf8(body.to_vec()).map_err(|err| FetchError::Decode(err.to_string()))
}

/// Opens a download stream, leaving the body unread so callers can decide
/// whether to pull it (the filename-collision check happens between request
/// and body read).
pub async fn fetch_stream(client: &Client, url: &str) -> Result<Response, FetchError> {
    debug!("GET {}", url);
    let res = client.get(url).send().await?;

    let status = res.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    Ok(res)
}

/// Streams a response body into `dest` chunk by chunk, returning the number
/// of bytes written. A mid-stream failure removes the partial file.
pub async fn save_body(res: Response, dest: &Path) -> Result<u64, SnagError> {
    debug!("Creating destination file {:?}", dest);
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dest)
        .await?;

    let mut written: u64 = 0;
    let mut stream = res.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let mut chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                drop(file);
                let _ = fs::remove_file(dest).await;
                return Err(FetchError::Transport(err).into());
            }
        };
        written += chunk.len() as u64;
        file.write_all_buf(&mut chunk).await?;
    }
    file.flush().await?;
    Ok(written)
}

static FILENAME_DQUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"filename="([^"]+)""#).unwrap());

static FILENAME_SQUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"filename='([^']+)'").unwrap());

static FILENAME_BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"filename=([^\s;]+)").unwrap());

/// Pulls a filename out of the Content-Disposition header, tolerating the
/// double-quoted, single-quoted and bare-token forms seen in the wild.
pub fn header_filename(headers: &HeaderMap) -> Option<String> {
    let disposition = headers.get(CONTENT_DISPOSITION)?.to_str().ok()?;

    for pattern in [&FILENAME_DQUOTED, &FILENAME_SQUOTED, &FILENAME_BARE] {
        if let Some(cap) = pattern.captures(disposition) {
            return Some(cap[1].to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers_with(disposition: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_str(disposition).unwrap(),
        );
        headers
    }

    #[test]
    fn double_quoted_filename() {
        let headers = headers_with(r#"attachment; filename="air horn.mp3""#);
        assert_eq!(header_filename(&headers).as_deref(), Some("air horn.mp3"));
    }

    #[test]
    fn single_quoted_filename() {
        let headers = headers_with("attachment; filename='track.mp3'");
        assert_eq!(header_filename(&headers).as_deref(), Some("track.mp3"));
    }

    #[test]
    fn bare_filename() {
        let headers = headers_with("attachment; filename=track.mp3; size=1");
        assert_eq!(header_filename(&headers).as_deref(), Some("track.mp3"));
    }

    #[test]
    fn missing_header() {
        assert_eq!(header_filename(&HeaderMap::new()), None);
    }

    #[test]
    fn disposition_without_filename() {
        let headers = headers_with("inline");
        assert_eq!(header_filename(&headers), None);
    }
}
