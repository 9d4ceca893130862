//! Interactive line-based player shell
//!
//! Reads commands from an async line source and media events from the sink
//! channel, multiplexing both on one task so the controller only ever sees
//! one input at a time.

use crate::error::{CliError, Result};
use std::io::Write;
use std::str::FromStr;
use strand_playback::{
    format_time, ListingSource, MediaEvent, MediaEventReceiver, MediaSink, PlayerController,
    PlayerState, RandomSource, ThreadRandom,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

pub const HELP: &str = "\
Commands:
  ls                 list folders and songs
  cd <n|name|/path>  enter folder number n, a subfolder by name, or an
                     absolute server path (cd .. goes up)
  up                 go to the parent folder
  root               go to the music root
  play <n>           play song number n
  next, prev         skip forward / back
  shuffle [on|off]   toggle or set shuffle
  pause              toggle play/pause
  seek <secs|m:ss>   jump to a position
  vol <0-100>        set volume
  mute               toggle mute
  status             show what is playing
  help               show this help
  quit               leave the shell";

/// A parsed shell command
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    List,
    Cd(String),
    Up,
    Root,
    /// 1-based song number as shown by `ls`
    Play(isize),
    Next,
    Prev,
    Shuffle(Option<bool>),
    Pause,
    Seek(f64),
    Volume(u8),
    Mute,
    Status,
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = CliError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
            None => (line, None),
        };

        let invalid = |reason: &str| CliError::InvalidArgument {
            command: name.to_string(),
            reason: reason.to_string(),
        };

        let command = match (name, arg) {
            ("ls" | "list", _) => ShellCommand::List,
            ("cd", Some("..")) | ("up", _) => ShellCommand::Up,
            ("cd", Some(target)) => ShellCommand::Cd(target.to_string()),
            ("cd" | "root", None) | ("root", Some(_)) => ShellCommand::Root,
            ("play" | "p", Some(n)) => ShellCommand::Play(
                n.parse()
                    .map_err(|_| invalid("expected a song number"))?,
            ),
            ("play" | "p", None) => return Err(invalid("expected a song number")),
            ("next" | "n", _) => ShellCommand::Next,
            ("prev" | "previous", _) => ShellCommand::Prev,
            ("shuffle", None) => ShellCommand::Shuffle(None),
            ("shuffle", Some("on")) => ShellCommand::Shuffle(Some(true)),
            ("shuffle", Some("off")) => ShellCommand::Shuffle(Some(false)),
            ("shuffle", Some(_)) => return Err(invalid("expected 'on' or 'off'")),
            ("pause", _) => ShellCommand::Pause,
            ("seek", Some(position)) => ShellCommand::Seek(
                parse_position(position).ok_or_else(|| invalid("expected seconds or m:ss"))?,
            ),
            ("seek", None) => return Err(invalid("expected seconds or m:ss")),
            ("vol" | "volume", Some(level)) => ShellCommand::Volume(
                level
                    .parse()
                    .ok()
                    .filter(|level| *level <= 100)
                    .ok_or_else(|| invalid("expected a level from 0 to 100"))?,
            ),
            ("vol" | "volume", None) => return Err(invalid("expected a level from 0 to 100")),
            ("mute", _) => ShellCommand::Mute,
            ("status" | "st", _) => ShellCommand::Status,
            ("help" | "?", _) => ShellCommand::Help,
            ("quit" | "exit" | "q", _) => ShellCommand::Quit,
            _ => return Err(CliError::UnknownCommand(name.to_string())),
        };

        Ok(command)
    }
}

/// Seconds (`95`, `12.5`) or `m:ss` (`1:35`)
fn parse_position(text: &str) -> Option<f64> {
    let seconds = match text.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u64 = minutes.parse().ok()?;
            let seconds: f64 = seconds.parse().ok()?;
            if !(0.0..60.0).contains(&seconds) {
                return None;
            }
            minutes as f64 * 60.0 + seconds
        }
        None => text.parse().ok()?,
    };
    (seconds.is_finite() && seconds >= 0.0).then_some(seconds)
}

/// Server path for a `cd` target
///
/// A leading separator makes the target absolute, otherwise it is taken
/// relative to `current`.
fn resolve_path(current: &str, target: &str) -> String {
    let is_separator = |c: char| c == '/' || c == '\\';
    let relative = target.trim_matches(is_separator);

    if target.starts_with(is_separator) || current.is_empty() {
        return relative.to_string();
    }
    if relative.is_empty() {
        return current.to_string();
    }
    format!("{}/{}", current, relative)
}

/// Whether the shell keeps reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Folder and song listing with 1-based numbers
pub fn render_listing(state: &PlayerState) -> String {
    let mut out = format!("/{}\n", state.current_path());

    if state.folders().is_empty() && state.songs().is_empty() {
        out.push_str("  (empty)\n");
        return out;
    }

    for (i, folder) in state.folders().iter().enumerate() {
        out.push_str(&format!("  {:>3}) {}/\n", i + 1, folder.name));
    }
    for (i, song) in state.songs().iter().enumerate() {
        let marker = if state.is_active(song) { '*' } else { ' ' };
        out.push_str(&format!("{} {:>3}. {}\n", marker, i + 1, song.name));
    }
    out
}

/// One-line transport summary
pub fn render_status(state: &PlayerState) -> String {
    let transport = state.transport();
    let volume = if transport.volume.is_muted() {
        "muted".to_string()
    } else {
        format!("{}%", transport.volume.percent())
    };
    let shuffle = if state.playback().shuffle { "on" } else { "off" };

    match state.current_song() {
        Some(song) => format!(
            "[{}] {}  {} / {}  vol {}  shuffle {}",
            if transport.playing { "playing" } else { "paused" },
            song.name,
            format_time(transport.position),
            format_time(transport.duration),
            volume,
            shuffle
        ),
        None => format!("Nothing playing  vol {}  shuffle {}", volume, shuffle),
    }
}

/// Interactive shell over a player controller
pub struct Shell<L, S, W, R = ThreadRandom> {
    controller: PlayerController<L, S, R>,
    out: W,
}

impl<L, S, W, R> Shell<L, S, W, R>
where
    L: ListingSource,
    S: MediaSink,
    W: Write,
    R: RandomSource,
{
    pub fn new(controller: PlayerController<L, S, R>, out: W) -> Self {
        Self { controller, out }
    }

    pub fn controller(&self) -> &PlayerController<L, S, R> {
        &self.controller
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Read commands until `quit` or end of input
    pub async fn run<I>(&mut self, input: I, mut events: MediaEventReceiver) -> Result<()>
    where
        I: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        self.prompt()?;

        loop {
            // Pending sink events are applied before the next command is read
            tokio::select! {
                biased;

                Some(event) = events.recv() => self.handle_event(event).await?,
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("Input closed");
                        break;
                    };
                    if self.handle_line(&line).await? == Flow::Quit {
                        break;
                    }
                    self.prompt()?;
                }
            }
        }

        Ok(())
    }

    /// Parse and execute one input line
    ///
    /// Parse errors are printed, not returned.
    pub async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        if line.trim().is_empty() {
            return Ok(Flow::Continue);
        }

        match line.parse::<ShellCommand>() {
            Ok(command) => self.execute(command).await,
            Err(err) => {
                writeln!(self.out, "{}", err)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Fold a sink event in, announcing track changes
    pub async fn handle_event(&mut self, event: MediaEvent) -> Result<()> {
        let before = self.active_path();
        self.controller.handle_media_event(event).await;
        self.announce(before)?;
        self.report_error().await
    }

    pub async fn execute(&mut self, command: ShellCommand) -> Result<Flow> {
        let before = self.active_path();

        match command {
            ShellCommand::List => self.print_listing()?,
            ShellCommand::Cd(target) => {
                let folder = target
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| self.controller.state().folders().get(i).cloned());
                match folder {
                    Some(folder) => self.controller.enter_folder(&folder).await,
                    None => {
                        let path = resolve_path(self.controller.state().current_path(), &target);
                        self.controller.enter_path(path).await;
                    }
                }
                self.print_listing()?;
            }
            ShellCommand::Up => {
                if self.controller.state().can_go_up() {
                    self.controller.go_up().await;
                    self.print_listing()?;
                } else {
                    writeln!(self.out, "Already at the root")?;
                }
            }
            ShellCommand::Root => {
                self.controller.browse_root().await;
                self.print_listing()?;
            }
            ShellCommand::Play(number) => {
                let count = self.controller.state().songs().len();
                let index = number
                    .checked_sub(1)
                    .filter(|&i| usize::try_from(i).is_ok_and(|i| i < count));
                match index {
                    Some(index) => self.controller.play_song_at_index(index).await,
                    None => writeln!(self.out, "No song number {} (1-{})", number, count)?,
                }
            }
            ShellCommand::Next => self.controller.next().await,
            ShellCommand::Prev => self.controller.previous().await,
            ShellCommand::Shuffle(enabled) => {
                match enabled {
                    Some(enabled) => self.controller.set_shuffle(enabled).await,
                    None => self.controller.toggle_shuffle().await,
                }
                let on = self.controller.state().playback().shuffle;
                writeln!(self.out, "Shuffle {}", if on { "on" } else { "off" })?;
            }
            ShellCommand::Pause => self.controller.toggle_play_pause().await,
            ShellCommand::Seek(position) => self.controller.seek(position).await,
            ShellCommand::Volume(level) => {
                self.controller.set_volume(f64::from(level) / 100.0).await;
            }
            ShellCommand::Mute => {
                let muted = self.controller.state().transport().volume.is_muted();
                self.controller.set_muted(!muted).await;
            }
            ShellCommand::Status => {
                let status = render_status(self.controller.state());
                writeln!(self.out, "{}", status)?;
            }
            ShellCommand::Help => writeln!(self.out, "{}", HELP)?,
            ShellCommand::Quit => return Ok(Flow::Quit),
        }

        self.announce(before)?;
        self.report_error().await?;
        Ok(Flow::Continue)
    }

    fn active_path(&self) -> Option<String> {
        self.controller.state().playback().active_path.clone()
    }

    fn announce(&mut self, before: Option<String>) -> Result<()> {
        if self.active_path() == before {
            return Ok(());
        }
        if let Some(song) = self.controller.state().current_song() {
            writeln!(self.out, "Now playing: {}", song.name)?;
        }
        Ok(())
    }

    /// Print the pending error once, then clear it
    async fn report_error(&mut self) -> Result<()> {
        if let Some(error) = self.controller.state().error() {
            writeln!(self.out, "{}", error)?;
            self.controller.clear_error().await;
        }
        Ok(())
    }

    fn print_listing(&mut self) -> Result<()> {
        let listing = render_listing(self.controller.state());
        write!(self.out, "{}", listing)?;
        Ok(())
    }

    fn prompt(&mut self) -> Result<()> {
        write!(self.out, "strand> ")?;
        self.out.flush()?;
        Ok(())
    }
}
