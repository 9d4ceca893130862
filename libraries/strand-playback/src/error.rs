//! Error types for navigation and playback

use thiserror::Error;

/// Playback errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    /// Folder or song listing could not be fetched
    #[error("{0}")]
    Listing(String),

    /// The media sink refused to start playback
    #[error("{0}")]
    PlaybackStart(String),
}

impl PlaybackError {
    /// Message shown to the user for this error
    ///
    /// Listing failures are prefixed with `Error:`, playback failures with
    /// `Playback error:`.
    pub fn display_message(&self) -> String {
        match self {
            PlaybackError::Listing(cause) => format!("Error: {}", cause),
            PlaybackError::PlaybackStart(cause) => format!("Playback error: {}", cause),
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
