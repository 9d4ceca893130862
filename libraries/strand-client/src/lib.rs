//! Strand Server Client
//!
//! HTTP client for the folder listing and streaming API of a Strand music
//! server.
//!
//! # Endpoints
//!
//! - `GET /folders?dir=<path>` - subfolders of a directory
//! - `GET /list?dir=<path>` - playable songs in a directory
//! - `GET /stream?file=<path>` - audio byte stream
//!
//! # Example
//!
//! ```ignore
//! use strand_client::{ClientConfig, StrandClient};
//! use strand_playback::{PlaybackConfig, PlayerController};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = StrandClient::new(ClientConfig::new("http://localhost:8080"))?;
//!
//!     // Use directly
//!     for folder in client.folders("").await? {
//!         println!("{}", folder.name);
//!     }
//!
//!     // Or as the listing backend of a player
//!     let mut player = PlayerController::new(client, None::<MySink>, PlaybackConfig::default());
//!     player.browse_root().await;
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::StrandClient;
pub use error::{ClientError, Result};
pub use types::{ClientConfig, DEFAULT_TIMEOUT};
