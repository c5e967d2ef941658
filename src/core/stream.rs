//! Streaming implementations for onedrive-dl
//!
//! Provides the response body reader and the fixed-size chunking used when
//! writing a download to disk.

use std::ops::RangeInclusive;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::TryStreamExt;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

/// Default chunk size for streaming a body to disk
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024; // 64KB

/// A unified stream over a response body
pub enum DownloadStream {
    /// HTTP stream using reqwest
    Http(Box<dyn AsyncRead + Send + Unpin>),
}

impl AsyncRead for DownloadStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match &mut *self {
            DownloadStream::Http(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

/// Progress callback: `(chunks_written, expected_chunks)`
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Options for download operations
#[derive(Clone)]
pub struct DownloadOptions {
    /// Optional progress callback
    pub progress: Option<ProgressCallback>,

    /// Size of each chunk read from the body and written to disk
    pub chunk_size: usize,

    /// Byte range sent as a `Range` header on the download request.
    /// The full body is written regardless of what the server returns.
    pub request_range: Option<RangeInclusive<u64>>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            progress: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            request_range: Some(0..=4096),
        }
    }
}

impl DownloadOptions {
    /// Value for the `Range` request header, if a request range is set
    pub fn range_header(&self) -> Option<String> {
        self.request_range
            .as_ref()
            .map(|range| format!("bytes={}-{}", range.start(), range.end()))
    }

    /// Number of progress units for a declared size (truncating division)
    pub fn expected_chunks(&self, total_size: u64) -> u64 {
        total_size / self.chunk_size as u64
    }
}

/// Creates a DownloadStream from an HTTP response
pub fn create_http_stream(response: reqwest::Response) -> DownloadStream {
    let stream = Box::new(tokio_util::io::StreamReader::new(
        response.bytes_stream().map_err(std::io::Error::other),
    ));
    DownloadStream::Http(stream)
}

/// Fills `buf` from `reader`, returning fewer bytes only at end of stream.
pub async fn read_chunk<R>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
