//! Retrieval of a single audio URL.
//!
//! The pipeline talks to the network only through [`Transport`], so tests can
//! swap in fakes. [`CurlTransport`] is the libcurl implementation.

mod curl_transport;

pub use curl_transport::{CurlTransport, DEFAULT_USER_AGENT};

use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Why a single retrieval attempt failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connect, DNS, timeout or other libcurl failure.
    #[error("transfer failed: {0}")]
    Transport(#[from] curl::Error),

    /// Server answered with a status outside 2xx.
    #[error("HTTP {0}")]
    Http(u32),

    /// Writing the streamed body to the sink failed.
    #[error("write failed: {0}")]
    Write(#[source] io::Error),

    /// Creating, moving or removing a file in the download directory failed.
    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FetchError::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// True for network-side failures (as opposed to local disk problems).
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Http(_))
    }
}

/// One blocking GET that streams the response body into `sink`.
///
/// Implementations make exactly one attempt and return the number of body
/// bytes written. A non-2xx status is an error.
pub trait Transport: Send + Sync {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64, FetchError>;
}
