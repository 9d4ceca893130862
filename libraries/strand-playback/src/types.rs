//! Core types for navigation and playback

use crate::volume::Volume;
use serde::{Deserialize, Serialize};

/// A subdirectory inside the current folder
///
/// `path` is relative to the server's music root and is passed back verbatim
/// when entering the folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    /// Display label
    pub name: String,

    /// Server-relative folder path
    pub path: String,
}

impl FolderEntry {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// A playable track inside the current folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongEntry {
    /// Display label
    pub name: String,

    /// Server-relative file path, used to build the stream URL
    pub path: String,
}

impl SongEntry {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Transport fields mirrored from the media sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transport {
    /// Whether the sink reports it is playing
    pub playing: bool,

    /// Current position in seconds
    pub position: f64,

    /// Track duration in seconds (0 while unknown)
    pub duration: f64,

    /// Output volume
    pub volume: Volume,
}

impl Transport {
    pub fn new(volume: Volume) -> Self {
        Self {
            playing: false,
            position: 0.0,
            duration: 0.0,
            volume,
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(Volume::default())
    }
}

/// Configuration for a new player state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Initial volume (0.0-1.0, default: 1.0)
    pub initial_volume: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            initial_volume: 1.0,
        }
    }
}
