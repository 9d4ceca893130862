//! Strand Player - navigation and playback
//!
//! Platform-agnostic core of a folder-browsing music player that streams
//! from a remote music server.
//!
//! This crate provides:
//! - Folder navigation with stale-response protection
//! - Sequential and shuffled next/previous ordering
//! - Fisher-Yates shuffle with an injectable random source
//! - Transport mirroring (position, duration, volume) from media events
//! - A controller driving a listing backend and a media sink
//!
//! # Architecture
//!
//! `strand-playback` knows nothing about HTTP or audio output:
//! - [`ListingSource`] lists folders/songs and builds stream URLs
//! - [`MediaSink`] is the audio element that plays a stream URL
//! - [`MediaEvent`]s flow back from the sink over a channel
//!
//! Platform code implements the two traits. With the `wasm` feature the
//! crate ships browser implementations and a JavaScript facade.
//!
//! # Example: Driving the state directly
//!
//! ```rust
//! use strand_playback::{Action, Effect, PlayerState, SeededRandom, SongEntry};
//!
//! let mut state = PlayerState::default();
//! let mut rng = SeededRandom::new(7);
//!
//! let effects = state.update(Action::EnterFolder { path: "jazz".into() }, &mut rng);
//! assert_eq!(effects.len(), 2);
//!
//! let generation = state.generation();
//! state.update(
//!     Action::SongsLoaded {
//!         generation,
//!         result: Ok(vec![SongEntry::new("Blue", "jazz/blue.mp3")]),
//!     },
//!     &mut rng,
//! );
//!
//! let effects = state.update(Action::PlaySongAtIndex(0), &mut rng);
//! assert_eq!(effects, vec![Effect::Load { path: "jazz/blue.mp3".into() }]);
//! ```

mod controller;
mod error;
mod events;
pub mod order;
mod shuffle;
mod source;
pub mod state;
pub mod time;
pub mod types;
mod volume;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use controller::{PendingFetches, PlayerController};
pub use error::{PlaybackError, Result};
pub use events::{media_channel, MediaEvent, MediaEventReceiver, MediaEventSender};
pub use order::{next_index, previous_index, TrackOrder};
pub use shuffle::{shuffle_order, RandomSource, SeededRandom, ThreadRandom};
pub use source::{ListingSource, MediaSink};
pub use state::{parent_path, Action, Effect, Navigation, Playback, PlayerState};
pub use time::format_time;
pub use types::{FolderEntry, PlaybackConfig, SongEntry, Transport};
pub use volume::Volume;
