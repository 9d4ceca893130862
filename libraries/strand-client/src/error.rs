//! Error types for the Strand server client.

use strand_playback::PlaybackError;
use thiserror::Error;

/// Errors that can occur when talking to a Strand music server.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),

    /// Server answered with a non-2xx status
    #[error("HTTP {status}: {status_text}")]
    Http { status: u16, status_text: String },

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl From<ClientError> for PlaybackError {
    fn from(err: ClientError) -> Self {
        PlaybackError::Listing(err.to_string())
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
