//! Controller tests against a scripted listing backend and a recording sink

use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use strand_playback::{
    media_channel, shuffle_order, FolderEntry, ListingSource, MediaEvent, MediaEventSender,
    MediaSink, PlaybackConfig, PlaybackError, PlayerController, Result, SeededRandom, SongEntry,
};

// ===== Test Helpers =====

/// Listing backend serving canned responses per directory
#[derive(Default)]
struct FakeListing {
    folders: HashMap<String, Result<Vec<FolderEntry>>>,
    songs: HashMap<String, Result<Vec<SongEntry>>>,
    calls: RefCell<Vec<String>>,
}

impl FakeListing {
    fn with_folders(mut self, dir: &str, result: Result<Vec<FolderEntry>>) -> Self {
        self.folders.insert(dir.to_string(), result);
        self
    }

    fn with_songs(mut self, dir: &str, count: usize) -> Self {
        let songs = (0..count)
            .map(|i| SongEntry::new(format!("{} {}", dir, i), format!("{}/{}.mp3", dir, i)))
            .collect();
        self.songs.insert(dir.to_string(), Ok(songs));
        self
    }
}

#[async_trait(?Send)]
impl ListingSource for FakeListing {
    async fn list_folders(&self, dir: &str) -> Result<Vec<FolderEntry>> {
        self.calls.borrow_mut().push(format!("folders:{}", dir));
        self.folders.get(dir).cloned().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn list_songs(&self, dir: &str) -> Result<Vec<SongEntry>> {
        self.calls.borrow_mut().push(format!("songs:{}", dir));
        self.songs.get(dir).cloned().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn stream_url(&self, path: &str) -> String {
        format!("http://music.test/stream?file={}", path)
    }
}

/// What the sink has been told to do
#[derive(Debug, Default)]
struct SinkLog {
    sources: Vec<String>,
    plays: usize,
    pauses: usize,
    seeks: Vec<f64>,
    volume: Option<f64>,
    muted: Option<bool>,
    paused: bool,
}

/// Sink that records commands and emits the events a real element would
struct RecordingSink {
    log: Rc<RefCell<SinkLog>>,
    events: MediaEventSender,
    refuse_play: bool,
}

impl RecordingSink {
    fn new(events: MediaEventSender) -> (Self, Rc<RefCell<SinkLog>>) {
        let log = Rc::new(RefCell::new(SinkLog {
            paused: true,
            ..SinkLog::default()
        }));
        let sink = Self {
            log: Rc::clone(&log),
            events,
            refuse_play: false,
        };
        (sink, log)
    }
}

impl MediaSink for RecordingSink {
    fn load(&mut self, url: &str) -> Result<()> {
        self.log.borrow_mut().sources.push(url.to_string());
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        if self.refuse_play {
            return Err(PlaybackError::PlaybackStart(
                "The play() request was interrupted".to_string(),
            ));
        }
        let mut log = self.log.borrow_mut();
        log.plays += 1;
        log.paused = false;
        self.events.send(MediaEvent::Play).unwrap();
        Ok(())
    }

    fn pause(&mut self) {
        let mut log = self.log.borrow_mut();
        log.pauses += 1;
        log.paused = true;
        self.events.send(MediaEvent::Pause).unwrap();
    }

    fn is_paused(&self) -> bool {
        self.log.borrow().paused
    }

    fn seek(&mut self, position: f64) {
        self.log.borrow_mut().seeks.push(position);
    }

    fn set_volume(&mut self, level: f64) {
        self.log.borrow_mut().volume = Some(level);
    }

    fn set_muted(&mut self, muted: bool) {
        self.log.borrow_mut().muted = Some(muted);
    }
}

type TestController = PlayerController<FakeListing, RecordingSink, SeededRandom>;

fn setup(listing: FakeListing) -> (TestController, Rc<RefCell<SinkLog>>, strand_playback::MediaEventReceiver) {
    let (tx, rx) = media_channel();
    let (sink, log) = RecordingSink::new(tx);
    let controller = PlayerController::with_random(
        listing,
        Some(sink),
        PlaybackConfig::default(),
        SeededRandom::new(2024),
    );
    (controller, log, rx)
}

/// Feed every queued sink event back into the controller
async fn drain(controller: &mut TestController, rx: &mut strand_playback::MediaEventReceiver) {
    while let Ok(event) = rx.try_recv() {
        controller.handle_media_event(event).await;
    }
}

// ===== Navigation =====

#[tokio::test]
async fn browse_root_fetches_folders_only() {
    let listing =
        FakeListing::default().with_folders("", Ok(vec![FolderEntry::new("Rock", "Rock")]));
    let (mut controller, _log, _rx) = setup(listing);

    controller.browse_root().await;

    assert_eq!(*controller.listing().calls.borrow(), vec!["folders:".to_string()]);
    assert_eq!(controller.state().folders().len(), 1);
    assert!(controller.state().songs().is_empty());
    assert!(!controller.state().can_go_up());
}

#[tokio::test]
async fn enter_folder_fetches_both_listings_for_same_path() {
    let listing = FakeListing::default()
        .with_folders("Rock", Ok(vec![FolderEntry::new("Live", "Rock/Live")]))
        .with_songs("Rock", 3);
    let (mut controller, _log, _rx) = setup(listing);

    controller
        .enter_folder(&FolderEntry::new("Rock", "Rock"))
        .await;

    let calls = controller.listing().calls.borrow().clone();
    assert!(calls.contains(&"folders:Rock".to_string()));
    assert!(calls.contains(&"songs:Rock".to_string()));

    let state = controller.state();
    assert_eq!(state.current_path(), "Rock");
    assert_eq!(state.folders()[0].path, "Rock/Live");
    assert_eq!(state.songs().len(), 3);
    assert!(!state.is_loading());
    assert_eq!(state.error(), None);
}

#[tokio::test]
async fn folder_failure_keeps_songs_and_reports_error() {
    let listing = FakeListing::default()
        .with_folders(
            "Jazz",
            Err(PlaybackError::Listing(
                "HTTP 500: Internal Server Error".to_string(),
            )),
        )
        .with_songs("Jazz", 2);
    let (mut controller, _log, _rx) = setup(listing);

    controller.enter_path("Jazz").await;

    let state = controller.state();
    assert_eq!(state.error(), Some("Error: HTTP 500: Internal Server Error"));
    assert!(state.folders().is_empty());
    assert_eq!(state.songs().len(), 2);
}

#[tokio::test]
async fn go_up_returns_to_parent_then_root() {
    let listing = FakeListing::default().with_songs("a/b", 1);
    let (mut controller, _log, _rx) = setup(listing);

    controller.enter_path("a/b/c").await;
    controller.go_up().await;
    assert_eq!(controller.state().current_path(), "a/b");
    assert_eq!(controller.state().songs().len(), 1);

    controller.go_up().await;
    controller.go_up().await;
    assert_eq!(controller.state().current_path(), "");

    let calls_before = controller.listing().calls.borrow().len();
    controller.go_up().await;
    assert_eq!(controller.listing().calls.borrow().len(), calls_before);
}

#[tokio::test]
async fn navigation_resets_active_track_even_with_enough_songs() {
    let listing = FakeListing::default().with_songs("A", 4).with_songs("B", 5);
    let (mut controller, _log, mut rx) = setup(listing);

    controller.enter_path("A").await;
    controller.play_song_at_index(2).await;
    drain(&mut controller, &mut rx).await;
    assert_eq!(controller.state().playback().active_index, Some(2));

    controller.enter_path("B").await;

    let playback = controller.state().playback();
    assert_eq!(playback.active_index, None);
    assert_eq!(playback.active_path, None);
    assert_eq!(controller.state().current_song(), None);
}

// ===== Playback =====

#[tokio::test]
async fn play_song_builds_stream_url_and_starts_sink() {
    let listing = FakeListing::default().with_songs("Rock", 3);
    let (mut controller, log, mut rx) = setup(listing);

    controller.enter_path("Rock").await;
    controller.play_song_at_index(1).await;
    drain(&mut controller, &mut rx).await;

    assert_eq!(
        log.borrow().sources,
        vec!["http://music.test/stream?file=Rock/1.mp3".to_string()]
    );
    assert_eq!(log.borrow().plays, 1);

    let state = controller.state();
    assert_eq!(state.playback().active_path.as_deref(), Some("Rock/1.mp3"));
    assert!(state.is_active(&state.songs()[1]));
    assert!(state.transport().playing);
}

#[tokio::test]
async fn out_of_range_play_leaves_sink_untouched() {
    let listing = FakeListing::default().with_songs("Rock", 3);
    let (mut controller, log, _rx) = setup(listing);

    controller.enter_path("Rock").await;
    let before = controller.state().clone();

    controller.play_song_at_index(-1).await;
    controller.play_song_at_index(3).await;

    assert_eq!(controller.state(), &before);
    assert!(log.borrow().sources.is_empty());
}

#[tokio::test]
async fn play_without_sink_is_noop() {
    let listing = FakeListing::default().with_songs("Rock", 3);
    let (mut controller, _log, _rx) = setup(listing);
    controller.enter_path("Rock").await;
    let sink = controller.detach_sink();
    assert!(sink.is_some());

    controller.play_song_at_index(0).await;
    controller.next().await;

    assert_eq!(controller.state().playback().active_index, None);
}

#[tokio::test]
async fn refused_play_reports_error_without_panicking() {
    let listing = FakeListing::default().with_songs("Rock", 2);
    let (mut controller, log, _rx) = setup(listing);
    controller.sink_mut().unwrap().refuse_play = true;

    controller.enter_path("Rock").await;
    controller.play_song_at_index(0).await;

    assert_eq!(
        controller.state().error(),
        Some("Playback error: The play() request was interrupted")
    );
    assert_eq!(log.borrow().sources.len(), 1);

    // Still usable afterwards
    controller.sink_mut().unwrap().refuse_play = false;
    controller.play_song_at_index(1).await;
    assert_eq!(log.borrow().plays, 1);
}

#[tokio::test]
async fn ended_advances_and_wraps_sequentially() {
    let listing = FakeListing::default().with_songs("Rock", 3);
    let (mut controller, log, mut rx) = setup(listing);

    controller.enter_path("Rock").await;
    controller.play_song_at_index(1).await;

    controller.handle_media_event(MediaEvent::Ended).await;
    assert_eq!(controller.state().playback().active_index, Some(2));

    controller.handle_media_event(MediaEvent::Ended).await;
    assert_eq!(controller.state().playback().active_index, Some(0));

    drain(&mut controller, &mut rx).await;
    assert_eq!(log.borrow().sources.len(), 3);
}

#[tokio::test]
async fn ended_with_empty_listing_stops_silently() {
    let (mut controller, log, _rx) = setup(FakeListing::default());

    controller.enter_path("Empty").await;
    controller.handle_media_event(MediaEvent::Ended).await;

    assert!(log.borrow().sources.is_empty());
    assert_eq!(controller.state().error(), None);
}

#[tokio::test]
async fn shuffled_navigation_follows_generated_order() {
    let listing = FakeListing::default().with_songs("Mix", 8);
    let (mut controller, _log, _rx) = setup(listing);
    let expected = shuffle_order(8, &mut SeededRandom::new(2024));

    controller.enter_path("Mix").await;
    controller.toggle_shuffle().await;
    assert_eq!(controller.state().playback().shuffle_order, expected);

    controller.play_song_at_index(expected[3] as isize).await;
    controller.next().await;
    assert_eq!(controller.state().playback().active_index, Some(expected[4]));

    controller.previous().await;
    controller.previous().await;
    assert_eq!(controller.state().playback().active_index, Some(expected[2]));
}

#[tokio::test]
async fn re_enabling_shuffle_regenerates_order() {
    let listing = FakeListing::default().with_songs("Mix", 30);
    let (mut controller, _log, _rx) = setup(listing);

    controller.enter_path("Mix").await;
    controller.set_shuffle(true).await;
    let first = controller.state().playback().shuffle_order.clone();

    controller.set_shuffle(false).await;
    controller.set_shuffle(true).await;
    let second = controller.state().playback().shuffle_order.clone();

    assert_eq!(second.len(), 30);
    assert_ne!(first, second);
}

// ===== Transport =====

#[tokio::test]
async fn play_pause_follows_sink_flag() {
    let listing = FakeListing::default().with_songs("Rock", 2);
    let (mut controller, log, mut rx) = setup(listing);

    controller.enter_path("Rock").await;
    controller.play_song_at_index(0).await;
    drain(&mut controller, &mut rx).await;

    controller.toggle_play_pause().await;
    drain(&mut controller, &mut rx).await;
    assert_eq!(log.borrow().pauses, 1);
    assert!(!controller.state().transport().playing);

    // Resumed from outside the controller (media keys)
    log.borrow_mut().paused = false;
    controller.toggle_play_pause().await;
    assert_eq!(log.borrow().pauses, 2);
}

#[tokio::test]
async fn seek_and_volume_write_through_to_sink() {
    let listing = FakeListing::default().with_songs("Rock", 1);
    let (mut controller, log, _rx) = setup(listing);

    controller.enter_path("Rock").await;
    controller.play_song_at_index(0).await;
    controller
        .handle_media_event(MediaEvent::DurationChange(240.0))
        .await;

    controller.seek(61.5).await;
    controller.set_volume(0.4).await;
    controller.set_muted(true).await;

    let log = log.borrow();
    assert_eq!(log.seeks, vec![61.5]);
    assert_eq!(log.volume, Some(0.4));
    assert_eq!(log.muted, Some(true));

    let transport = controller.state().transport();
    assert_eq!(transport.position, 61.5);
    assert_eq!(transport.volume.level(), 0.4);
    assert!(transport.volume.is_muted());
}

#[tokio::test]
async fn configured_volume_is_pushed_to_sink() {
    let (tx, _rx) = media_channel();
    let (sink, log) = RecordingSink::new(tx);
    let _controller = PlayerController::with_random(
        FakeListing::default(),
        Some(sink),
        PlaybackConfig {
            initial_volume: 0.3,
        },
        SeededRandom::new(1),
    );

    assert_eq!(log.borrow().volume, Some(0.3));
    assert_eq!(log.borrow().muted, Some(false));
}

#[tokio::test]
async fn media_error_event_reports_playback_error() {
    let listing = FakeListing::default().with_songs("Rock", 1);
    let (mut controller, _log, _rx) = setup(listing);

    controller.enter_path("Rock").await;
    controller
        .handle_media_event(MediaEvent::Error("NotAllowedError".to_string()))
        .await;
    assert_eq!(
        controller.state().error(),
        Some("Playback error: NotAllowedError")
    );

    controller.enter_path("Rock").await;
    assert_eq!(controller.state().error(), None);
}
