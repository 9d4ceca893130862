//! Seams to the outside world
//!
//! `MediaSink` is the single streaming audio element the controller owns.
//! `ListingSource` is the backend that lists folders and songs and knows how
//! to turn a song path into a stream URL.

use crate::error::Result;
use crate::types::{FolderEntry, SongEntry};
use async_trait::async_trait;

/// Platform audio element
///
/// Only the controller calls these methods. Progress and state changes flow
/// back through [`MediaEvent`](crate::MediaEvent)s on the sink's channel.
pub trait MediaSink {
    /// Replace the current source with the given URL
    fn load(&mut self, url: &str) -> Result<()>;

    /// Start or resume playback
    ///
    /// Errors returned here are immediate refusals. Sinks whose play request
    /// settles later report a rejection as `MediaEvent::Error` instead.
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self);

    /// The sink's own paused flag
    ///
    /// Play/pause toggling consults this rather than the mirrored state so
    /// changes made outside the controller (OS media keys) stay in sync.
    fn is_paused(&self) -> bool;

    /// Move the play head (seconds)
    fn seek(&mut self, position: f64);

    /// Set output level (0.0-1.0)
    fn set_volume(&mut self, level: f64);

    fn set_muted(&mut self, muted: bool);
}

/// Backend that serves folder listings and audio streams
///
/// `dir` is a server-relative path; the empty string is the music root.
#[async_trait(?Send)]
pub trait ListingSource {
    /// Subfolders of `dir`
    async fn list_folders(&self, dir: &str) -> Result<Vec<FolderEntry>>;

    /// Playable songs in `dir`
    async fn list_songs(&self, dir: &str) -> Result<Vec<SongEntry>>;

    /// URL the media sink streams `path` from
    fn stream_url(&self, path: &str) -> String;
}

impl<S: MediaSink + ?Sized> MediaSink for Box<S> {
    fn load(&mut self, url: &str) -> Result<()> {
        (**self).load(url)
    }

    fn play(&mut self) -> Result<()> {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause();
    }

    fn is_paused(&self) -> bool {
        (**self).is_paused()
    }

    fn seek(&mut self, position: f64) {
        (**self).seek(position);
    }

    fn set_volume(&mut self, level: f64) {
        (**self).set_volume(level);
    }

    fn set_muted(&mut self, muted: bool) {
        (**self).set_muted(muted);
    }
}
