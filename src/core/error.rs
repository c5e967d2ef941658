//! Error types for onedrive-dl
//!
//! Provides the error taxonomy for the redirect and download requests.

use std::fmt;

/// Main error type for onedrive-dl operations
#[derive(Debug)]
pub enum Error {
    /// The share link did not resolve to a 200 response
    RedirectFailed { url: String, status: u16 },

    /// The rewritten download URL could not be parsed
    InvalidUrl(String),

    /// HTTP-specific error
    HttpError(String),

    /// File I/O error
    IoError(std::io::Error),

    /// Invalid configuration or parameters
    InvalidInput(String),

    /// Network connectivity issues
    NetworkError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::RedirectFailed { url, status } => {
                write!(f, "Failed to resolve share link {}: HTTP {}", url, status)
            }
            Error::InvalidUrl(msg) => {
                write!(f, "Invalid download URL: {}", msg)
            }
            Error::HttpError(msg) => {
                write!(f, "HTTP error: {}", msg)
            }
            Error::IoError(err) => {
                write!(f, "I/O error: {}", err)
            }
            Error::InvalidInput(msg) => {
                write!(f, "Invalid input: {}", msg)
            }
            Error::NetworkError(msg) => {
                write!(f, "Network error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_body() {
            Error::NetworkError(err.to_string())
        } else {
            Error::HttpError(err.to_string())
        }
    }
}

/// Convenience result type for onedrive-dl operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_failed_display() {
        let err = Error::RedirectFailed {
            url: "https://tinyurl.com/abc".to_string(),
            status: 403,
        };
        let msg = err.to_string();
        assert!(msg.contains("https://tinyurl.com/abc"));
        assert!(msg.contains("403"));
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error as _;

        let err: Error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("I/O error"));

        let err = Error::InvalidInput("chunk size must be non-zero".to_string());
        assert!(err.source().is_none());
    }
}
