//! Share link configuration and URL handling for onedrive-dl
//!
//! Holds the fetch configuration and the pure string transformations that
//! turn a OneDrive viewer link into a direct download link and pick the
//! destination filename.

use std::path::PathBuf;
use std::time::Duration;

use log::warn;

/// Viewer page path segment produced by the share link redirect
pub const VIEWER_SEGMENT: &str = "onedrive.aspx";

/// Download endpoint path segment that replaces [`VIEWER_SEGMENT`]
pub const DOWNLOAD_SEGMENT: &str = "download.aspx";

/// Query key used by the viewer page
pub const VIEWER_QUERY_KEY: &str = "?id=";

/// Query key expected by the download endpoint
pub const DOWNLOAD_QUERY_KEY: &str = "?SourceUrl=";

/// Filename used when neither the response nor the URL yields a usable one
pub const FALLBACK_FILENAME: &str = "download";

/// SharePoint session cookie the download endpoint authenticates with
pub const SESSION_COOKIE: &str = "FedAuth";

/// Browser user agent; SharePoint throttles or blocks unknown agents
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:135.0) Gecko/20100101 Firefox/135.0";

/// Configuration for a fetch
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Share link that redirects to the OneDrive viewer page
    pub entry_url: String,

    /// Directory the downloaded file is written into
    pub output_dir: PathBuf,

    /// User agent sent with both requests
    pub user_agent: String,

    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,

    /// Maximum number of redirects followed while resolving the share link
    pub max_redirects: usize,

    /// Cookie expected from the redirect chain; a warning is logged without it
    pub session_cookie: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            entry_url: "https://tinyurl.com/5c6cnx96".to_string(),
            output_dir: PathBuf::from("."),
            user_agent: BROWSER_USER_AGENT.to_string(),
            request_timeout: None,
            max_redirects: 10,
            session_cookie: Some(SESSION_COOKIE.to_string()),
        }
    }
}

/// Rewrites a resolved viewer URL into the direct download endpoint.
///
/// Purely textual: every occurrence of the viewer path segment and query key
/// is replaced, everything else is left untouched.
pub fn rewrite_download_url(resolved_url: &str) -> String {
    if !is_viewer_url(resolved_url) {
        warn!("Resolved URL does not look like a OneDrive viewer link: {resolved_url}");
    }

    resolved_url
        .replace(VIEWER_SEGMENT, DOWNLOAD_SEGMENT)
        .replace(VIEWER_QUERY_KEY, DOWNLOAD_QUERY_KEY)
}

/// Whether a URL carries either fragment the rewrite replaces
pub fn is_viewer_url(url: &str) -> bool {
    url.contains(VIEWER_SEGMENT) || url.contains(VIEWER_QUERY_KEY)
}

/// Extracts the filename from a raw Content-Disposition header value.
///
/// Looks for `filename="..."` first, then an unquoted `filename=token`.
/// `filename*=` parameters are ignored.
pub fn filename_from_content_disposition(header_value: &str) -> Option<String> {
    if let Some((_, rest)) = header_value.split_once("filename=\"") {
        let name = rest.split('"').next().unwrap_or(rest);
        return Some(name.to_string());
    }

    let (_, rest) = header_value.split_once("filename=")?;
    let name = rest.split(';').next().unwrap_or(rest).trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Derives a filename from the last `/`-separated segment of a URL,
/// with any query string stripped.
pub fn filename_from_url(url: &str) -> String {
    let last = url.rsplit('/').next().unwrap_or(url);
    last.split('?').next().unwrap_or(last).to_string()
}

/// Picks the destination filename for a download.
///
/// A Content-Disposition filename wins regardless of URL shape; otherwise the
/// name comes from the URL.
pub fn resolve_output_filename(content_disposition: Option<&str>, url: &str) -> String {
    let name = content_disposition
        .and_then(filename_from_content_disposition)
        .unwrap_or_else(|| filename_from_url(url));
    sanitize_filename(&name)
}

/// Keeps only the final path component so a response header cannot steer
/// the write outside the output directory.
fn sanitize_filename(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    match last {
        "" | "." | ".." => FALLBACK_FILENAME.to_string(),
        other => other.to_string(),
    }
}
