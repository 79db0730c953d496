//! Errors raised while obtaining analysis records.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain records from the analysis service or a local file.
///
/// Any of these means no chart is produced for the request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("Cannot connect to analysis service at {url}. Is it running?")]
    Connect { url: String },

    #[error("Analysis service error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Unexpected response format: {0}")]
    Decode(String),

    #[error("Failed to send request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout { .. } | FetchError::Connect { .. } | FetchError::Request(_) => {
                true
            }
            FetchError::Status { status, .. } => status.is_server_error(),
            FetchError::Decode(_) | FetchError::Io { .. } => false,
        }
    }
}
