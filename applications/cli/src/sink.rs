//! Media sink that plays streams through an external command

use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use strand_playback::{MediaEvent, MediaEventSender, MediaSink, PlaybackError};
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Plays each stream URL by spawning `command... <url>`
///
/// The process is the play head: pausing stops it and a later play starts
/// the current source again from the beginning. A natural exit is reported
/// as `Ended`. Seek and volume are recorded but cannot be applied to a
/// running process.
///
/// With an empty command nothing is spawned and the URL is only logged.
pub struct CommandSink {
    command: Vec<String>,
    events: MediaEventSender,
    source: Option<String>,

    /// Dropping or firing this stops the running process
    stop: Option<oneshot::Sender<()>>,

    /// Cleared by the watcher task when the current process exits on its own
    running: Arc<AtomicBool>,

    paused: bool,
    position: f64,
    volume: f64,
    muted: bool,
}

impl CommandSink {
    pub fn new(command: Vec<String>, events: MediaEventSender) -> Self {
        Self {
            command,
            events,
            source: None,
            stop: None,
            running: Arc::new(AtomicBool::new(false)),
            paused: true,
            position: 0.0,
            volume: 1.0,
            muted: false,
        }
    }

    /// True when no external player is configured
    pub fn is_dry_run(&self) -> bool {
        self.command.is_empty()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Last requested seek position (seconds)
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn stop_process(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    /// Start the player for `url`
    ///
    /// Each process gets its own `running` flag, so a late exit of a
    /// replaced process never marks its successor as stopped.
    fn spawn(&mut self, url: &str, running: Arc<AtomicBool>) -> strand_playback::Result<()> {
        let Some((program, args)) = self.command.split_first() else {
            info!(url = %url, "No player command configured, not streaming");
            return Ok(());
        };

        let mut child = Command::new(program)
            .args(args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PlaybackError::PlaybackStart(format!("{}: {}", program, e)))?;

        debug!(program = %program, pid = ?child.id(), "Player process started");

        let (stop_tx, mut stop_rx) = oneshot::channel();
        self.stop = Some(stop_tx);
        let events = self.events.clone();

        tokio::spawn(async move {
            let exited = tokio::select! {
                status = child.wait() => Some(status),
                _ = &mut stop_rx => None,
            };

            let Some(status) = exited else {
                let _ = child.kill().await;
                return;
            };

            // A stop requested while the process was exiting wins
            if !matches!(stop_rx.try_recv(), Err(oneshot::error::TryRecvError::Empty)) {
                return;
            }

            running.store(false, Ordering::Release);
            let _ = events.send(exit_event(status));
        });

        Ok(())
    }
}

fn exit_event(status: std::io::Result<ExitStatus>) -> MediaEvent {
    match status {
        Ok(status) if status.success() => MediaEvent::Ended,
        Ok(status) => {
            warn!(status = %status, "Player process failed");
            MediaEvent::Error(format!("player exited with {}", status))
        }
        Err(e) => MediaEvent::Error(e.to_string()),
    }
}

impl MediaSink for CommandSink {
    fn load(&mut self, url: &str) -> strand_playback::Result<()> {
        self.stop_process();
        self.source = Some(url.to_string());
        self.position = 0.0;
        self.paused = true;
        Ok(())
    }

    fn play(&mut self) -> strand_playback::Result<()> {
        let Some(url) = self.source.clone() else {
            return Err(PlaybackError::PlaybackStart("no source loaded".to_string()));
        };
        if !self.is_paused() {
            return Ok(());
        }

        let running = Arc::new(AtomicBool::new(true));
        self.spawn(&url, Arc::clone(&running))?;
        self.running = running;
        self.paused = false;
        let _ = self.events.send(MediaEvent::Play);
        Ok(())
    }

    fn pause(&mut self) {
        if self.is_paused() {
            return;
        }
        self.stop_process();
        self.paused = true;
        let _ = self.events.send(MediaEvent::Pause);
    }

    fn is_paused(&self) -> bool {
        self.paused || !self.running.load(Ordering::Acquire)
    }

    fn seek(&mut self, position: f64) {
        debug!(position, "Seek recorded");
        self.position = position;
    }

    fn set_volume(&mut self, level: f64) {
        self.volume = level;
        let _ = self.events.send(MediaEvent::VolumeChange {
            volume: self.volume,
            muted: self.muted,
        });
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        let _ = self.events.send(MediaEvent::VolumeChange {
            volume: self.volume,
            muted: self.muted,
        });
    }
}

impl Drop for CommandSink {
    fn drop(&mut self) {
        self.stop_process();
    }
}
