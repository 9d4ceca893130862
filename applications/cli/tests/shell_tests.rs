/// Shell tests
/// Drives the interactive shell with a scripted listing backend and a dry-run sink
use async_trait::async_trait;
use std::collections::HashMap;
use strand_cli::{CommandSink, Flow, Shell, ShellCommand};
use strand_playback::{
    media_channel, FolderEntry, ListingSource, MediaEvent, MediaEventReceiver, MediaSink,
    PlaybackConfig, PlaybackError, PlayerController, Result, SeededRandom, SongEntry,
};

/// Listing backend over an in-memory tree
#[derive(Default)]
struct MemoryListing {
    folders: HashMap<String, Vec<FolderEntry>>,
    songs: HashMap<String, Vec<SongEntry>>,
}

impl MemoryListing {
    fn library() -> Self {
        let mut listing = Self::default();
        listing.folders.insert(
            String::new(),
            vec![
                FolderEntry::new("Jazz", "Jazz"),
                FolderEntry::new("Rock", "Rock"),
            ],
        );
        listing.folders.insert(
            "Jazz".to_string(),
            vec![FolderEntry::new("Live", "Jazz/Live")],
        );
        listing.songs.insert(
            "Jazz".to_string(),
            vec![
                SongEntry::new("So What", "Jazz/so-what.mp3"),
                SongEntry::new("Blue in Green", "Jazz/blue-in-green.mp3"),
            ],
        );
        listing
    }
}

#[async_trait(?Send)]
impl ListingSource for MemoryListing {
    async fn list_folders(&self, dir: &str) -> Result<Vec<FolderEntry>> {
        Ok(self.folders.get(dir).cloned().unwrap_or_default())
    }

    async fn list_songs(&self, dir: &str) -> Result<Vec<SongEntry>> {
        if dir == "Broken" {
            return Err(PlaybackError::Listing(
                "HTTP 500: Internal Server Error".to_string(),
            ));
        }
        Ok(self.songs.get(dir).cloned().unwrap_or_default())
    }

    fn stream_url(&self, path: &str) -> String {
        format!("http://localhost:8080/stream?file={}", path)
    }
}

type TestShell = Shell<MemoryListing, CommandSink, Vec<u8>, SeededRandom>;

fn shell() -> (TestShell, MediaEventReceiver) {
    let (tx, rx) = media_channel();
    let sink = CommandSink::new(Vec::new(), tx);
    let controller = PlayerController::with_random(
        MemoryListing::library(),
        Some(sink),
        PlaybackConfig::default(),
        SeededRandom::new(99),
    );
    (Shell::new(controller, Vec::new()), rx)
}

fn output(shell: &TestShell) -> String {
    String::from_utf8_lossy(shell.output()).into_owned()
}

/// Test root listing numbers folders
#[tokio::test]
async fn test_root_lists_folders() {
    let (mut shell, _rx) = shell();

    shell.execute(ShellCommand::Root).await.unwrap();

    assert_eq!(output(&shell), "/\n    1) Jazz/\n    2) Rock/\n");
}

/// Test cd by number enters the folder and lists songs
#[tokio::test]
async fn test_cd_by_number_and_play() {
    let (mut shell, _rx) = shell();
    shell.execute(ShellCommand::Root).await.unwrap();

    shell.handle_line("cd 1").await.unwrap();
    shell.handle_line("play 2").await.unwrap();

    let out = output(&shell);
    assert!(out.contains("/Jazz\n    1) Live/\n    1. So What\n    2. Blue in Green\n"));
    assert!(out.contains("Now playing: Blue in Green"));

    let sink = shell.controller().sink().unwrap();
    assert_eq!(
        sink.source(),
        Some("http://localhost:8080/stream?file=Jazz/blue-in-green.mp3")
    );
    assert!(!sink.is_paused());
}

/// Test out-of-range song numbers are reported and change nothing
#[tokio::test]
async fn test_play_out_of_range() {
    let (mut shell, _rx) = shell();
    shell.handle_line("cd Jazz").await.unwrap();

    shell.handle_line("play 0").await.unwrap();
    shell.handle_line("play 3").await.unwrap();

    assert!(output(&shell).contains("No song number 3 (1-2)"));
    assert_eq!(shell.controller().state().playback().active_index, None);
}

/// Test song numbers at the edge of the integer range are rejected, not wrapped
#[tokio::test]
async fn test_play_extreme_numbers() {
    let (mut shell, _rx) = shell();
    shell.handle_line("cd Jazz").await.unwrap();

    let flow = shell
        .handle_line("play -9223372036854775808")
        .await
        .unwrap();
    shell.handle_line("play 9223372036854775807").await.unwrap();

    assert_eq!(flow, Flow::Continue);
    let out = output(&shell);
    assert!(out.contains("No song number -9223372036854775808 (1-2)"));
    assert!(out.contains("No song number 9223372036854775807 (1-2)"));
    assert_eq!(shell.controller().state().playback().active_index, None);
}

/// Test cd by name is relative to the current folder, a leading slash is absolute
#[tokio::test]
async fn test_cd_by_name_is_relative() {
    let (mut shell, _rx) = shell();
    shell.handle_line("cd Jazz").await.unwrap();

    shell.handle_line("cd Live").await.unwrap();
    assert_eq!(shell.controller().state().current_path(), "Jazz/Live");

    shell.handle_line("cd /Rock").await.unwrap();
    assert_eq!(shell.controller().state().current_path(), "Rock");
}

/// Test listing errors are printed once
#[tokio::test]
async fn test_listing_error_is_printed() {
    let (mut shell, _rx) = shell();

    shell.handle_line("cd Broken").await.unwrap();
    shell.handle_line("status").await.unwrap();

    let out = output(&shell);
    assert_eq!(
        out.matches("Error: HTTP 500: Internal Server Error")
            .count(),
        1
    );
    assert_eq!(shell.controller().state().error(), None);
}

/// Test up at root and unknown commands do not stop the shell
#[tokio::test]
async fn test_messages_for_noops_and_typos() {
    let (mut shell, _rx) = shell();

    assert_eq!(shell.handle_line("up").await.unwrap(), Flow::Continue);
    assert_eq!(shell.handle_line("dance").await.unwrap(), Flow::Continue);
    assert_eq!(shell.handle_line("   ").await.unwrap(), Flow::Continue);
    assert_eq!(shell.handle_line("quit").await.unwrap(), Flow::Quit);

    let out = output(&shell);
    assert!(out.contains("Already at the root"));
    assert!(out.contains("Unknown command: dance"));
}

/// Test track end from the sink advances to the next song
#[tokio::test]
async fn test_ended_event_advances() {
    let (mut shell, _rx) = shell();
    shell.handle_line("cd Jazz").await.unwrap();
    shell.handle_line("play 1").await.unwrap();

    shell.handle_event(MediaEvent::Ended).await.unwrap();

    assert!(output(&shell).contains("Now playing: Blue in Green"));
    assert_eq!(shell.controller().state().playback().active_index, Some(1));
}

/// Test the run loop reads lines and folds in sink events until quit
#[tokio::test]
async fn test_run_until_quit() {
    let (mut shell, rx) = shell();
    let input: &[u8] = b"cd Jazz\nplay 1\nshuffle on\nvol 40\nmute\nstatus\nquit\nls\n";

    shell.run(input, rx).await.unwrap();

    let out = output(&shell);
    assert!(out.starts_with("strand> "));
    assert!(out.contains("Shuffle on"));
    assert!(out.contains("[playing] So What"));
    assert!(out.contains("vol muted"));
    assert!(out.contains("shuffle on"));
    // Nothing after quit is executed
    assert_eq!(out.matches("/Jazz").count(), 1);

    let transport = shell.controller().state().transport();
    assert_eq!(transport.volume.level(), 0.4);
    assert!(transport.volume.is_muted());
}
