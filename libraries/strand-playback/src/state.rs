//! Player state and its update function
//!
//! `PlayerState` holds everything the front end renders: the current folder
//! and its listings, the active track, the shuffle order and the mirrored
//! transport. It only changes through [`PlayerState::update`], which folds an
//! [`Action`] into the state and returns the [`Effect`]s the caller must
//! carry out (fetches, media sink commands).
//!
//! Navigation bumps a generation counter. Listing results carry the
//! generation they were requested under and are dropped if a newer
//! navigation has started since, so an overlapping slow response can never
//! overwrite the listing the user is looking at.

use crate::error::PlaybackError;
use crate::events::MediaEvent;
use crate::order::{next_index, previous_index, TrackOrder};
use crate::shuffle::{shuffle_order, RandomSource};
use crate::types::{FolderEntry, PlaybackConfig, SongEntry, Transport};
use crate::volume::Volume;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Folder the user is looking at and its contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Navigation {
    /// Server-relative path, empty for the music root
    pub current_path: String,

    /// Subfolders of `current_path`
    pub folders: Vec<FolderEntry>,

    /// Songs in `current_path`
    pub songs: Vec<SongEntry>,
}

/// Active track and shuffle state
///
/// Indices are only meaningful against the song listing they were taken
/// from, so this is reset whenever the song listing is replaced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Playback {
    /// Index of the loaded track in the song listing
    pub active_index: Option<usize>,

    /// Path of the loaded track, used for highlighting
    pub active_path: Option<String>,

    /// Whether shuffle is enabled
    pub shuffle: bool,

    /// Permutation of song indices, generated when shuffle is switched on
    pub shuffle_order: Vec<usize>,
}

/// Input to [`PlayerState::update`]
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Go to the music root and list its folders
    BrowseRoot,

    /// Navigate into a folder
    EnterFolder { path: String },

    /// Navigate to the parent of the current folder
    GoUp,

    /// Folder listing request settled
    FoldersLoaded {
        generation: u64,
        result: Result<Vec<FolderEntry>, PlaybackError>,
    },

    /// Song listing request settled
    SongsLoaded {
        generation: u64,
        result: Result<Vec<SongEntry>, PlaybackError>,
    },

    /// Load and play the song at the given listing index
    PlaySongAtIndex(isize),

    /// Skip forward per the active ordering
    Next,

    /// Skip back per the active ordering
    Previous,

    ToggleShuffle,

    SetShuffle(bool),

    /// Play if the sink is paused, pause otherwise
    TogglePlayPause { sink_paused: bool },

    /// Seek to a position in seconds
    Seek(f64),

    /// Set output volume (0.0-1.0)
    SetVolume(f64),

    SetMuted(bool),

    /// Notification from the media sink
    Media(MediaEvent),

    /// The sink refused to start playback
    PlaybackFailed(String),

    ClearError,
}

impl Action {
    /// Whether this action drives the media sink to start a track
    pub fn starts_playback(&self) -> bool {
        matches!(
            self,
            Action::PlaySongAtIndex(_)
                | Action::Next
                | Action::Previous
                | Action::TogglePlayPause { .. }
                | Action::Media(MediaEvent::Ended)
        )
    }
}

/// Work requested by [`PlayerState::update`]
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// List the folders of `dir`
    FetchFolders { generation: u64, dir: String },

    /// List the songs of `dir`
    FetchSongs { generation: u64, dir: String },

    /// Point the sink at the stream for `path` and start playback
    Load { path: String },

    Play,

    Pause,

    Seek(f64),

    SetVolume(f64),

    SetMuted(bool),
}

/// Complete navigation and playback state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    navigation: Navigation,
    playback: Playback,
    transport: Transport,

    /// Latest user-facing error, replaced rather than accumulated
    error: Option<String>,

    /// True while any fetch of the latest navigation is outstanding
    loading: bool,

    /// Incremented on every navigation
    generation: u64,

    /// Fetches of the latest generation still in flight
    pending: u32,
}

impl PlayerState {
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            navigation: Navigation::default(),
            playback: Playback::default(),
            transport: Transport::new(Volume::new(config.initial_volume)),
            error: None,
            loading: false,
            generation: 0,
            pending: 0,
        }
    }

    // ===== Accessors =====

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Generation of the most recent navigation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn current_path(&self) -> &str {
        &self.navigation.current_path
    }

    pub fn folders(&self) -> &[FolderEntry] {
        &self.navigation.folders
    }

    pub fn songs(&self) -> &[SongEntry] {
        &self.navigation.songs
    }

    /// The song currently loaded into the sink
    pub fn current_song(&self) -> Option<&SongEntry> {
        self.playback
            .active_index
            .and_then(|index| self.navigation.songs.get(index))
    }

    /// Whether `song` is the one playing (for highlighting)
    pub fn is_active(&self, song: &SongEntry) -> bool {
        self.playback.active_path.as_deref() == Some(song.path.as_str())
    }

    /// False at the music root
    pub fn can_go_up(&self) -> bool {
        !self.navigation.current_path.is_empty()
    }

    /// Next index per the active ordering, without moving
    pub fn next_index(&self) -> Option<usize> {
        next_index(
            self.navigation.songs.len(),
            self.playback.active_index,
            self.track_order(),
        )
    }

    /// Previous index per the active ordering, without moving
    pub fn previous_index(&self) -> Option<usize> {
        previous_index(
            self.navigation.songs.len(),
            self.playback.active_index,
            self.track_order(),
        )
    }

    fn track_order(&self) -> TrackOrder<'_> {
        if self.playback.shuffle {
            TrackOrder::Shuffled(&self.playback.shuffle_order)
        } else {
            TrackOrder::Sequential
        }
    }

    // ===== Update =====

    /// Fold `action` into the state
    ///
    /// Returns the effects the caller must perform, in order.
    pub fn update<R: RandomSource + ?Sized>(&mut self, action: Action, rng: &mut R) -> Vec<Effect> {
        match action {
            Action::BrowseRoot => {
                self.navigation.current_path.clear();
                self.navigation.songs.clear();
                self.playback = Playback::default();
                let generation = self.begin_navigation(1);
                vec![Effect::FetchFolders {
                    generation,
                    dir: String::new(),
                }]
            }
            Action::EnterFolder { path } => self.navigate(path),
            Action::GoUp => {
                if !self.can_go_up() {
                    return Vec::new();
                }
                let parent = parent_path(&self.navigation.current_path);
                self.navigate(parent)
            }
            Action::FoldersLoaded { generation, result } => {
                if !self.accept(generation, "folders") {
                    return Vec::new();
                }
                match result {
                    Ok(folders) => {
                        debug!(count = folders.len(), "Folder listing applied");
                        self.navigation.folders = folders;
                    }
                    Err(err) => {
                        self.error = Some(err.display_message());
                        self.navigation.folders.clear();
                    }
                }
                Vec::new()
            }
            Action::SongsLoaded { generation, result } => {
                if !self.accept(generation, "songs") {
                    return Vec::new();
                }
                match result {
                    Ok(songs) => {
                        debug!(count = songs.len(), "Song listing applied");
                        self.navigation.songs = songs;
                    }
                    Err(err) => {
                        self.error = Some(err.display_message());
                        self.navigation.songs.clear();
                    }
                }
                // Old indices and paths say nothing about the new listing
                self.playback = Playback::default();
                Vec::new()
            }
            Action::PlaySongAtIndex(index) => self.play_index(index),
            Action::Next => self.skip(self.next_index()),
            Action::Previous => self.skip(self.previous_index()),
            Action::ToggleShuffle => {
                let enabled = !self.playback.shuffle;
                self.set_shuffle(enabled, rng);
                Vec::new()
            }
            Action::SetShuffle(enabled) => {
                self.set_shuffle(enabled, rng);
                Vec::new()
            }
            Action::TogglePlayPause { sink_paused } => {
                if !sink_paused {
                    return vec![Effect::Pause];
                }
                if self.playback.active_index.is_none() {
                    // Nothing loaded yet: start wherever the ordering begins
                    return self.skip(self.next_index());
                }
                vec![Effect::Play]
            }
            Action::Seek(position) => {
                if !position.is_finite() {
                    return Vec::new();
                }
                let mut position = position.max(0.0);
                if self.transport.duration > 0.0 {
                    position = position.min(self.transport.duration);
                }
                self.transport.position = position;
                vec![Effect::Seek(position)]
            }
            Action::SetVolume(level) => {
                self.transport.volume.set_level(level);
                vec![Effect::SetVolume(self.transport.volume.level())]
            }
            Action::SetMuted(muted) => {
                self.transport.volume.set_muted(muted);
                vec![Effect::SetMuted(muted)]
            }
            Action::Media(event) => self.apply_media_event(event),
            Action::PlaybackFailed(cause) => {
                self.error = Some(PlaybackError::PlaybackStart(cause).display_message());
                Vec::new()
            }
            Action::ClearError => {
                self.error = None;
                Vec::new()
            }
        }
    }

    fn navigate(&mut self, path: String) -> Vec<Effect> {
        self.navigation.current_path = path.clone();
        let generation = self.begin_navigation(2);
        vec![
            Effect::FetchFolders {
                generation,
                dir: path.clone(),
            },
            Effect::FetchSongs {
                generation,
                dir: path,
            },
        ]
    }

    fn begin_navigation(&mut self, fetches: u32) -> u64 {
        self.generation += 1;
        self.pending = fetches;
        self.loading = true;
        self.error = None;
        debug!(
            generation = self.generation,
            path = %self.navigation.current_path,
            "Navigation started"
        );
        self.generation
    }

    /// Check a listing response against the latest generation
    fn accept(&mut self, generation: u64, listing: &str) -> bool {
        if generation != self.generation {
            debug!(
                listing,
                stale = generation,
                latest = self.generation,
                "Discarding stale listing response"
            );
            return false;
        }
        self.pending = self.pending.saturating_sub(1);
        self.loading = self.pending > 0;
        true
    }

    fn play_index(&mut self, index: isize) -> Vec<Effect> {
        // Negative indices are out of range like any other
        usize::try_from(index)
            .map(|index| self.skip(Some(index)))
            .unwrap_or_default()
    }

    fn skip(&mut self, target: Option<usize>) -> Vec<Effect> {
        let Some(index) = target else {
            return Vec::new();
        };
        let Some(song) = self.navigation.songs.get(index) else {
            return Vec::new();
        };

        let path = song.path.clone();
        self.playback.active_index = Some(index);
        self.playback.active_path = Some(path.clone());
        vec![Effect::Load { path }]
    }

    fn set_shuffle<R: RandomSource + ?Sized>(&mut self, enabled: bool, rng: &mut R) {
        if self.playback.shuffle == enabled {
            return;
        }
        self.playback.shuffle = enabled;

        if enabled {
            // Generated only on the OFF -> ON edge
            self.playback.shuffle_order = shuffle_order(self.navigation.songs.len(), rng);
            debug!(order = ?self.playback.shuffle_order, "Shuffle enabled");
        }
    }

    fn apply_media_event(&mut self, event: MediaEvent) -> Vec<Effect> {
        match event {
            MediaEvent::TimeUpdate(position) => {
                if position.is_finite() {
                    self.transport.position = position;
                }
            }
            MediaEvent::DurationChange(duration) => {
                self.transport.duration = if duration.is_finite() { duration } else { 0.0 };
            }
            MediaEvent::Play => self.transport.playing = true,
            MediaEvent::Pause => self.transport.playing = false,
            MediaEvent::Ended => {
                let next = self.next_index();
                if next.is_none() {
                    self.transport.playing = false;
                }
                return self.skip(next);
            }
            MediaEvent::VolumeChange { volume, muted } => {
                self.transport.volume.set_level(volume);
                self.transport.volume.set_muted(muted);
            }
            MediaEvent::Error(cause) => {
                self.transport.playing = false;
                self.error = Some(PlaybackError::PlaybackStart(cause).display_message());
            }
        }
        Vec::new()
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(PlaybackConfig::default())
    }
}

/// Parent of a server-relative path
///
/// Accepts both `/` and `\` as separators and ignores empty segments. The
/// parent of a single-segment path is the root (empty string).
pub fn parent_path(path: &str) -> String {
    let mut segments: Vec<&str> = path
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty())
        .collect();
    segments.pop();
    segments.join("/")
}
