//! Core library modules for onedrive-dl
//!
//! This module contains the internal implementation details of the onedrive-dl library.

pub mod error;
pub mod size;
pub mod source;
pub mod stream;
pub mod downloader;

// Re-export main types for internal use
pub use source::{FetchConfig, resolve_output_filename, rewrite_download_url};
pub use downloader::Fetcher;
