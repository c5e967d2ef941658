//! # onedrive-dl
//!
//! Fetches a single shared OneDrive/SharePoint file through its redirect link.
//!
//! The share link is followed to the OneDrive viewer page, the viewer URL is
//! rewritten into the `download.aspx` endpoint, and the file is streamed to
//! disk in fixed-size chunks using the session cookies from the redirect.
//!
//! ```no_run
//! # async fn run() -> onedrive_dl::Result<()> {
//! use onedrive_dl::{DownloadOptions, FetchConfig, FetchOutcome};
//!
//! let config = FetchConfig {
//!     entry_url: "https://tinyurl.com/5c6cnx96".to_string(),
//!     ..Default::default()
//! };
//!
//! match onedrive_dl::fetch_with_options(config, DownloadOptions::default()).await? {
//!     FetchOutcome::Saved(report) => println!("saved {}", report.path.display()),
//!     FetchOutcome::Rejected { status } => println!("rejected: {status}"),
//! }
//! # Ok(())
//! # }
//! ```

mod core;

pub use crate::core::{resolve_output_filename, rewrite_download_url, FetchConfig, Fetcher};
pub use crate::core::downloader::{
    download_url_message, file_size_message, rejection_message, request_time_message,
    saved_message, DownloadMetadata, DownloadReport, FetchOutcome, RedirectResult,
};
pub use crate::core::error::{Error, Result};
pub use crate::core::size::sizeof_fmt;
pub use crate::core::source::{
    filename_from_content_disposition, filename_from_url, is_viewer_url, BROWSER_USER_AGENT,
    SESSION_COOKIE,
};
pub use crate::core::stream::{DownloadOptions, ProgressCallback, DEFAULT_CHUNK_SIZE};

/// Fetch the file behind the default share link into the current directory
pub async fn fetch(options: DownloadOptions) -> Result<FetchOutcome> {
    fetch_with_options(FetchConfig::default(), options).await
}

/// Fetch with a custom configuration and download options
pub async fn fetch_with_options(config: FetchConfig, options: DownloadOptions) -> Result<FetchOutcome> {
    Fetcher::with_config(config).fetch(&options).await
}
