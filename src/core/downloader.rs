//! Core fetch functionality for onedrive-dl
//!
//! Resolves a share link through its redirect chain, rewrites the viewer URL
//! into the download endpoint and streams the file to disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_LENGTH, COOKIE, RANGE};
use reqwest::redirect::Policy;
use reqwest::{ClientBuilder, StatusCode, Url};
use tokio::io::AsyncWriteExt;

use crate::core::error::{Error, Result};
use crate::core::size::sizeof_fmt;
use crate::core::source::{resolve_output_filename, rewrite_download_url, FetchConfig};
use crate::core::stream::{create_http_stream, read_chunk, DownloadOptions};

/// Outcome of following the share link
#[derive(Debug, Clone)]
pub struct RedirectResult {
    /// Status of the last response in the chain
    pub status: StatusCode,

    /// URL after all redirects were followed
    pub final_url: Url,

    /// Cookies the redirect chain left for the final URL
    pub cookies: BTreeMap<String, String>,

    /// Wall-clock time of the request
    pub elapsed: Duration,
}

impl RedirectResult {
    /// Whether the redirect chain left the named session cookie
    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }
}

/// Size and destination name taken from the download response
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadMetadata {
    /// Declared size in bytes, 0 when the server did not send one
    pub total_size: u64,

    /// Destination filename
    pub filename: String,
}

/// Summary of a completed download
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadReport {
    /// Path the file was written to
    pub path: PathBuf,

    /// Name chosen for the file
    pub filename: String,

    /// Size the server declared
    pub total_size: u64,

    /// Bytes actually written
    pub bytes_written: u64,

    /// Chunks written
    pub chunks: u64,
}

/// Result of a fetch that completed without a transport or I/O failure
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The file was written to disk
    Saved(DownloadReport),

    /// The download endpoint answered with something other than 200 or 206
    Rejected { status: StatusCode },
}

/// Console message for a rejected download response
pub fn rejection_message(status: StatusCode) -> String {
    format!("HTTP error downloading file: {}", status.as_u16())
}

/// Console message with the share link resolution time
pub fn request_time_message(elapsed: Duration) -> String {
    format!("request time: {:.3}s", elapsed.as_secs_f64())
}

/// Console message announcing the rewritten download URL
pub fn download_url_message(url: &str) -> String {
    format!("new download url: \n{url}")
}

/// Console message with the declared file size
pub fn file_size_message(total_size: u64) -> String {
    format!("file size: {}", sizeof_fmt(u128::from(total_size)))
}

/// Console message once the file is on disk
pub fn saved_message(path: &Path) -> String {
    format!("file downloaded as {}!", path.display())
}

/// Fetches a single shared file through its redirect link
pub struct Fetcher {
    config: FetchConfig,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    /// Create a new fetcher with default configuration
    pub fn new() -> Self {
        Self {
            config: FetchConfig::default(),
        }
    }

    /// Create a new fetcher with custom configuration
    pub fn with_config(config: FetchConfig) -> Self {
        Self { config }
    }

    /// Configuration this fetcher runs with
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Run the whole fetch: resolve, rewrite, download.
    pub async fn fetch(&self, options: &DownloadOptions) -> Result<FetchOutcome> {
        if options.chunk_size == 0 {
            return Err(Error::InvalidInput("chunk size must be non-zero".to_string()));
        }

        let redirect = self.resolve_redirect().await?;
        println!("{}", request_time_message(redirect.elapsed));

        if redirect.status != StatusCode::OK {
            return Err(Error::RedirectFailed {
                url: self.config.entry_url.clone(),
                status: redirect.status.as_u16(),
            });
        }

        let download_url = rewrite_download_url(redirect.final_url.as_str());
        println!("{}", download_url_message(&download_url));

        self.download(&download_url, &redirect.cookies, options).await
    }

    /// Follow the share link and collect the session cookies it sets.
    ///
    /// A fresh cookie jar is used for every call so cookies from an earlier
    /// fetch never leak into this one.
    pub async fn resolve_redirect(&self) -> Result<RedirectResult> {
        let jar = Arc::new(Jar::default());
        let client = self
            .client_builder()
            .cookie_provider(Arc::clone(&jar))
            .redirect(Policy::limited(self.config.max_redirects))
            .build()?;

        let start = Instant::now();
        let response = client.get(&self.config.entry_url).send().await?;
        let elapsed = start.elapsed();

        let status = response.status();
        let final_url = response.url().clone();
        debug!("Share link resolved to {final_url} ({status})");

        let cookies = jar
            .cookies(&final_url)
            .and_then(|value| value.to_str().ok().map(parse_cookie_header))
            .unwrap_or_default();
        if cookies.is_empty() {
            warn!("Redirect chain set no cookies for {final_url}");
        }

        let redirect = RedirectResult {
            status,
            final_url,
            cookies,
            elapsed,
        };
        if let Some(name) = self.config.session_cookie.as_deref() {
            if !redirect.has_cookie(name) {
                warn!("Session cookie {name} missing after redirect; the download endpoint will likely refuse the request");
            }
        }

        Ok(redirect)
    }

    /// Request the download endpoint and stream the body to disk.
    ///
    /// The fallback filename is taken from `raw_url` as given, before URL
    /// parsing normalizes it.
    pub async fn download(
        &self,
        raw_url: &str,
        cookies: &BTreeMap<String, String>,
        options: &DownloadOptions,
    ) -> Result<FetchOutcome> {
        let url = Url::parse(raw_url).map_err(|e| Error::InvalidUrl(format!("{raw_url}: {e}")))?;
        let client = self.client_builder().build()?;

        let mut request = client.get(url);
        if !cookies.is_empty() {
            request = request.header(COOKIE, cookie_header(cookies));
        }
        if let Some(range) = options.range_header() {
            request = request.header(RANGE, range);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("Download endpoint answered {status}");

        if status != StatusCode::OK && status != StatusCode::PARTIAL_CONTENT {
            println!("{}", rejection_message(status));
            return Ok(FetchOutcome::Rejected { status });
        }

        let metadata = download_metadata(response.headers(), raw_url);
        println!("{}", file_size_message(metadata.total_size));

        let path = self.config.output_dir.join(&metadata.filename);
        let (bytes_written, chunks) = stream_to_file(response, &path, metadata.total_size, options).await?;

        println!("{}", saved_message(&path));

        Ok(FetchOutcome::Saved(DownloadReport {
            path,
            filename: metadata.filename,
            total_size: metadata.total_size,
            bytes_written,
            chunks,
        }))
    }

    fn client_builder(&self) -> ClientBuilder {
        let mut builder = ClientBuilder::new().user_agent(self.config.user_agent.clone());
        if let Some(timeout) = self.config.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder
    }
}

/// Read size and filename from the download response headers
fn download_metadata(headers: &HeaderMap, url: &str) -> DownloadMetadata {
    let total_size = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0);

    // Servers send raw UTF-8 filenames, which `to_str` rejects
    let disposition = headers
        .get(CONTENT_DISPOSITION)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

    DownloadMetadata {
        total_size,
        filename: resolve_output_filename(disposition.as_deref(), url),
    }
}

/// Write the body to `path` chunk by chunk, returning `(bytes, chunks)`.
async fn stream_to_file(
    response: reqwest::Response,
    path: &Path,
    total_size: u64,
    options: &DownloadOptions,
) -> Result<(u64, u64)> {
    let expected_chunks = options.expected_chunks(total_size);
    let mut stream = create_http_stream(response);
    let mut file = tokio::fs::File::create(path).await?;
    let mut buffer = vec![0u8; options.chunk_size];

    let mut downloaded = 0u64;
    let mut chunks = 0u64;

    loop {
        let bytes_read = read_chunk(&mut stream, &mut buffer)
            .await
            .map_err(|e| Error::NetworkError(format!("Stream read error: {e}")))?;

        if bytes_read == 0 {
            break;
        }

        chunks += 1;
        if let Some(ref progress) = options.progress {
            progress(chunks, expected_chunks);
        }

        file.write_all(&buffer[..bytes_read]).await?;
        downloaded += bytes_read as u64;
    }

    file.flush().await?;
    debug!("Wrote {downloaded} bytes in {chunks} chunks to {}", path.display());

    Ok((downloaded, chunks))
}

/// Split a `Cookie` header value into name/value pairs
fn parse_cookie_header(value: &str) -> BTreeMap<String, String> {
    value
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            Some((name.trim().to_string(), value.trim().to_string()))
        })
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

/// Build a `Cookie` header value from name/value pairs
fn cookie_header(cookies: &BTreeMap<String, String>) -> String {
    cookies
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ")
}
