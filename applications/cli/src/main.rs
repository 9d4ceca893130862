/// Strand - browse and play music from a Strand server
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strand_cli::{CliConfig, CommandSink, Shell};
use strand_client::StrandClient;
use strand_playback::{media_channel, PlayerController};
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "strand")]
#[command(about = "Browse and play music from a Strand server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "STRAND_CONFIG")]
    config: Option<PathBuf>,

    /// Server URL, overrides the configuration
    #[arg(short, long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the subfolders of a directory
    Folders {
        /// Server-relative directory, root if omitted
        dir: Option<String>,
    },
    /// List the songs in a directory
    Songs {
        /// Server-relative directory, root if omitted
        dir: Option<String>,
    },
    /// Start the interactive player
    Shell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing on stderr so listings and the shell own stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "strand_cli=info,strand_playback=info,strand_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?
        .with_server(cli.server);
    config.validate()?;

    match cli.command {
        Commands::Folders { dir } => list_folders(&config, &dir.unwrap_or_default()).await?,
        Commands::Songs { dir } => list_songs(&config, &dir.unwrap_or_default()).await?,
        Commands::Shell => shell(&config).await?,
    }

    Ok(())
}

async fn list_folders(config: &CliConfig, dir: &str) -> anyhow::Result<()> {
    let client = StrandClient::new(config.client_config())?;
    for folder in client.folders(dir).await? {
        println!("{}/", folder.name);
    }
    Ok(())
}

async fn list_songs(config: &CliConfig, dir: &str) -> anyhow::Result<()> {
    let client = StrandClient::new(config.client_config())?;
    for song in client.songs(dir).await? {
        println!("{}", song.name);
    }
    Ok(())
}

async fn shell(config: &CliConfig) -> anyhow::Result<()> {
    let client = StrandClient::new(config.client_config())?;

    tracing::info!("Connecting to {}", client.url());
    if config.player.command.is_empty() {
        tracing::warn!("No player.command configured, streams will only be logged");
    }

    let (events_tx, events_rx) = media_channel();
    let sink = CommandSink::new(config.player.command.clone(), events_tx);
    let controller = PlayerController::new(client, Some(sink), config.playback_config());

    let mut shell = Shell::new(controller, std::io::stdout());
    shell.execute(strand_cli::ShellCommand::Root).await?;
    shell
        .run(BufReader::new(tokio::io::stdin()), events_rx)
        .await?;

    Ok(())
}
