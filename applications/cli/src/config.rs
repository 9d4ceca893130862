/// CLI configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use strand_client::ClientConfig;
use strand_playback::PlaybackConfig;

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "strand.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_player")]
    pub player: PlayerSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerSettings {
    /// External player invoked with the stream URL appended, empty for a dry run
    #[serde(default)]
    pub command: Vec<String>,

    /// Initial volume (0-100)
    #[serde(default = "default_volume")]
    pub volume: u8,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist. Without one, `strand.toml` in the
    /// working directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::build(path, None)
    }

    /// Like [`CliConfig::load`], reading `STRAND_` variables from `vars`
    /// instead of the process environment
    pub fn load_with_env(path: Option<&Path>, vars: config::Map<String, String>) -> Result<Self> {
        Self::build(path, Some(vars))
    }

    fn build(path: Option<&Path>, vars: Option<config::Map<String, String>>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with STRAND_)
        settings = settings.add_source(
            config::Environment::with_prefix("STRAND")
                .separator("_")
                .try_parsing(true)
                .list_separator(" ")
                .with_list_parse_key("player.command")
                .source(vars),
        );

        Ok(settings.build()?.try_deserialize()?)
    }

    /// Replace the server URL (command line override)
    pub fn with_server(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.server.url = url;
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = self.server.url.trim();
        if url.is_empty() {
            return Err(CliError::Config(
                "server URL is required (set STRAND_SERVER_URL)".to_string(),
            ));
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(CliError::Config(format!(
                "server URL must start with http:// or https://, got {url}"
            )));
        }

        if self.server.timeout == 0 {
            return Err(CliError::Config("server timeout must be positive".to_string()));
        }

        if self.player.volume > 100 {
            return Err(CliError::Config(format!(
                "player volume must be 0-100, got {}",
                self.player.volume
            )));
        }

        if self.player.command.first().is_some_and(|program| program.trim().is_empty()) {
            return Err(CliError::Config("player command is blank".to_string()));
        }

        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.server.url.clone())
            .with_timeout(Duration::from_secs(self.server.timeout))
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            initial_volume: f64::from(self.player.volume) / 100.0,
        }
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        url: default_url(),
        timeout: default_timeout(),
    }
}

fn default_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_player() -> PlayerSettings {
    PlayerSettings {
        command: Vec::new(),
        volume: default_volume(),
    }
}

fn default_volume() -> u8 {
    100
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            player: default_player(),
        }
    }
}
