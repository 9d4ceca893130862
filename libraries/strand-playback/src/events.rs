//! Media sink events
//!
//! The sink is the only producer of position, duration and play-state
//! updates. It reports them as discrete events on an unbounded channel and
//! the controller folds them into the player state one at a time.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Notification emitted by a media sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MediaEvent {
    /// Playback position advanced (seconds)
    TimeUpdate(f64),

    /// Track duration became known or changed (seconds)
    DurationChange(f64),

    /// Playback started or resumed
    Play,

    /// Playback paused
    Pause,

    /// Current track finished playing
    Ended,

    /// Volume or mute state changed on the sink
    VolumeChange {
        /// New level (0.0-1.0)
        volume: f64,
        /// Whether output is muted
        muted: bool,
    },

    /// Playback could not start, or the media failed while loading
    Error(String),
}

/// Sending half handed to a media sink
pub type MediaEventSender = mpsc::UnboundedSender<MediaEvent>;

/// Receiving half drained by the controller's owner
pub type MediaEventReceiver = mpsc::UnboundedReceiver<MediaEvent>;

/// Create the channel that connects a sink to its controller
pub fn media_channel() -> (MediaEventSender, MediaEventReceiver) {
    mpsc::unbounded_channel()
}
