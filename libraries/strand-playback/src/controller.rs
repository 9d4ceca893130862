//! Player controller - drives the state against a listing backend and a sink
//!
//! The controller owns the [`PlayerState`], the [`ListingSource`] and an
//! optional [`MediaSink`]. Each operation is turned into an [`Action`], folded
//! into the state, and the resulting [`Effect`]s are carried out: fetches are
//! awaited together and their results fed back in, sink commands are issued
//! in order.

use crate::{
    events::MediaEvent,
    shuffle::{RandomSource, ThreadRandom},
    source::{ListingSource, MediaSink},
    state::{Action, Effect, PlayerState},
    types::{FolderEntry, PlaybackConfig},
};
use tracing::{debug, info, warn};

/// Pending fetch for one listing kind
type Fetch = Option<(u64, String)>;

/// Listing fetches requested by an action, not yet run
///
/// Holds no borrow of the controller, so the fetches can be awaited while
/// other actions (media events, transport buttons, a newer navigation) are
/// applied.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[must_use]
pub struct PendingFetches {
    folders: Fetch,
    songs: Fetch,
}

impl PendingFetches {
    pub fn is_empty(&self) -> bool {
        self.folders.is_none() && self.songs.is_none()
    }

    /// Run the fetches concurrently against `listing`
    ///
    /// Each fetch settles independently: one failing does not discard the
    /// other's result.
    pub async fn run<L: ListingSource + ?Sized>(self, listing: &L) -> Vec<Action> {
        let Self { folders, songs } = self;

        let folder_task = async move {
            let (generation, dir) = folders?;
            let result = listing.list_folders(&dir).await;
            if let Err(err) = &result {
                warn!(dir = %dir, error = %err, "Folder listing failed");
            }
            Some(Action::FoldersLoaded { generation, result })
        };

        let song_task = async move {
            let (generation, dir) = songs?;
            let result = listing.list_songs(&dir).await;
            if let Err(err) = &result {
                warn!(dir = %dir, error = %err, "Song listing failed");
            }
            Some(Action::SongsLoaded { generation, result })
        };

        let (folders, songs) = futures_util::join!(folder_task, song_task);
        folders.into_iter().chain(songs).collect()
    }

    /// Later requests replace earlier ones of the same kind
    fn merge(&mut self, other: PendingFetches) {
        if other.folders.is_some() {
            self.folders = other.folders;
        }
        if other.songs.is_some() {
            self.songs = other.songs;
        }
    }
}

/// Navigation and playback controller
pub struct PlayerController<L, S, R = ThreadRandom> {
    state: PlayerState,
    listing: L,
    sink: Option<S>,
    rng: R,
}

impl<L, S> PlayerController<L, S, ThreadRandom>
where
    L: ListingSource,
    S: MediaSink,
{
    /// Create a controller using the thread-local random generator for shuffle
    pub fn new(listing: L, sink: Option<S>, config: PlaybackConfig) -> Self {
        Self::with_random(listing, sink, config, ThreadRandom)
    }
}

impl<L, S, R> PlayerController<L, S, R>
where
    L: ListingSource,
    S: MediaSink,
    R: RandomSource,
{
    /// Create a controller with an explicit random source
    pub fn with_random(listing: L, sink: Option<S>, config: PlaybackConfig, rng: R) -> Self {
        let mut controller = Self {
            state: PlayerState::new(config),
            listing,
            sink,
            rng,
        };
        controller.sync_sink_volume();
        controller
    }

    // ===== Accessors =====

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn listing(&self) -> &L {
        &self.listing
    }

    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    pub fn sink_mut(&mut self) -> Option<&mut S> {
        self.sink.as_mut()
    }

    /// Install (or replace) the media sink
    pub fn attach_sink(&mut self, sink: S) {
        self.sink = Some(sink);
        self.sync_sink_volume();
    }

    /// Remove the media sink, returning it
    pub fn detach_sink(&mut self) -> Option<S> {
        self.sink.take()
    }

    /// Stream URL for the currently loaded song
    pub fn current_stream_url(&self) -> Option<String> {
        self.state
            .current_song()
            .map(|song| self.listing.stream_url(&song.path))
    }

    // ===== Navigation =====

    /// Show the music root
    pub async fn browse_root(&mut self) {
        info!("Browsing music root");
        self.dispatch(Action::BrowseRoot).await;
    }

    /// Navigate into `folder`
    pub async fn enter_folder(&mut self, folder: &FolderEntry) {
        self.enter_path(folder.path.clone()).await;
    }

    /// Navigate to a server-relative path
    pub async fn enter_path(&mut self, path: impl Into<String>) {
        let path = path.into();
        info!(path = %path, "Entering folder");
        self.dispatch(Action::EnterFolder { path }).await;
    }

    /// Navigate to the parent folder (no-op at the root)
    pub async fn go_up(&mut self) {
        self.dispatch(Action::GoUp).await;
    }

    // ===== Playback Control =====

    /// Load and play the song at `index` in the current listing
    ///
    /// Out-of-range indices (negative included) are ignored.
    pub async fn play_song_at_index(&mut self, index: isize) {
        self.dispatch(Action::PlaySongAtIndex(index)).await;
    }

    /// Skip to the next track
    pub async fn next(&mut self) {
        self.dispatch(Action::Next).await;
    }

    /// Skip to the previous track
    pub async fn previous(&mut self) {
        self.dispatch(Action::Previous).await;
    }

    pub async fn toggle_shuffle(&mut self) {
        self.dispatch(Action::ToggleShuffle).await;
    }

    pub async fn set_shuffle(&mut self, enabled: bool) {
        self.dispatch(Action::SetShuffle(enabled)).await;
    }

    /// Play if the sink is paused, pause otherwise
    pub async fn toggle_play_pause(&mut self) {
        let Some(action) = self.play_pause_action() else {
            debug!("No media sink, ignoring play/pause");
            return;
        };
        self.dispatch(action).await;
    }

    /// Seek to `position` seconds
    pub async fn seek(&mut self, position: f64) {
        self.dispatch(Action::Seek(position)).await;
    }

    /// Set volume (0.0-1.0)
    pub async fn set_volume(&mut self, level: f64) {
        self.dispatch(Action::SetVolume(level)).await;
    }

    pub async fn set_muted(&mut self, muted: bool) {
        self.dispatch(Action::SetMuted(muted)).await;
    }

    pub async fn clear_error(&mut self) {
        self.dispatch(Action::ClearError).await;
    }

    /// Fold a sink notification into the state
    ///
    /// `Ended` advances to the next track per the active ordering.
    pub async fn handle_media_event(&mut self, event: MediaEvent) {
        if let MediaEvent::Error(cause) = &event {
            warn!(error = %cause, "Media sink reported an error");
        }
        self.dispatch(Action::Media(event)).await;
    }

    // ===== Dispatch =====

    /// Apply an action and carry out everything it requests
    ///
    /// Listing fetches are awaited while the controller stays borrowed. Front
    /// ends that share the controller between tasks use [`Self::begin`] and
    /// [`Self::complete`] instead, running the fetches in between.
    pub async fn dispatch(&mut self, action: Action) {
        let mut pending = self.begin(action);
        while !pending.is_empty() {
            let results = pending.run(&self.listing).await;
            pending = self.complete(results);
        }
    }

    /// Apply an action and issue its sink commands
    ///
    /// Returns the listing fetches the action requested. Their results go
    /// back in through [`Self::complete`]; results of a navigation that has
    /// since been superseded are discarded there.
    pub fn begin(&mut self, action: Action) -> PendingFetches {
        if action.starts_playback() && self.sink.is_none() {
            debug!(?action, "No media sink available, ignoring");
            return PendingFetches::default();
        }

        debug!(?action, "Dispatching");
        let effects = self.state.update(action, &mut self.rng);
        self.apply(effects)
    }

    /// Feed fetched listings back into the state
    pub fn complete(&mut self, results: Vec<Action>) -> PendingFetches {
        let mut pending = PendingFetches::default();
        for action in results {
            let effects = self.state.update(action, &mut self.rng);
            pending.merge(self.apply(effects));
        }
        pending
    }

    /// Play/pause action for the sink's current paused flag
    ///
    /// `None` when no sink is attached.
    pub fn play_pause_action(&self) -> Option<Action> {
        let sink_paused = self.sink.as_ref()?.is_paused();
        Some(Action::TogglePlayPause { sink_paused })
    }

    /// Run sink effects to completion, collecting the fetches
    fn apply(&mut self, mut effects: Vec<Effect>) -> PendingFetches {
        let mut pending = PendingFetches::default();

        while !effects.is_empty() {
            let mut followups = Vec::new();

            for effect in effects.drain(..) {
                match effect {
                    Effect::FetchFolders { generation, dir } => {
                        pending.folders = Some((generation, dir));
                    }
                    Effect::FetchSongs { generation, dir } => {
                        pending.songs = Some((generation, dir));
                    }
                    effect => followups.extend(self.apply_to_sink(effect)),
                }
            }

            for action in followups {
                effects.extend(self.state.update(action, &mut self.rng));
            }
        }

        pending
    }

    /// Issue a sink command, returning a follow-up action if it was refused
    fn apply_to_sink(&mut self, effect: Effect) -> Option<Action> {
        let Some(sink) = self.sink.as_mut() else {
            debug!(?effect, "No media sink, dropping effect");
            return None;
        };

        match effect {
            Effect::Load { path } => {
                let url = self.listing.stream_url(&path);
                info!(path = %path, url = %url, "Loading track");
                if let Err(err) = sink.load(&url) {
                    return Some(Action::PlaybackFailed(err.to_string()));
                }
                sink.play()
                    .err()
                    .map(|err| Action::PlaybackFailed(err.to_string()))
            }
            Effect::Play => sink
                .play()
                .err()
                .map(|err| Action::PlaybackFailed(err.to_string())),
            Effect::Pause => {
                sink.pause();
                None
            }
            Effect::Seek(position) => {
                sink.seek(position);
                None
            }
            Effect::SetVolume(level) => {
                sink.set_volume(level);
                None
            }
            Effect::SetMuted(muted) => {
                sink.set_muted(muted);
                None
            }
            Effect::FetchFolders { .. } | Effect::FetchSongs { .. } => None,
        }
    }

    /// Push the configured volume to a newly attached sink
    fn sync_sink_volume(&mut self) {
        let volume = self.state.transport().volume;
        if let Some(sink) = self.sink.as_mut() {
            sink.set_volume(volume.level());
            sink.set_muted(volume.is_muted());
        }
    }
}
