//! Strand music server client.

use crate::error::{ClientError, Result};
use crate::types::ClientConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use strand_playback::{FolderEntry, ListingSource, SongEntry};
use tracing::{debug, warn};
use url::{form_urlencoded, Url};

/// Client for the listing and streaming endpoints of a Strand server.
///
/// Implements [`ListingSource`] so it can back a
/// [`PlayerController`](strand_playback::PlayerController) directly.
///
/// # Example
///
/// ```ignore
/// use strand_client::{ClientConfig, StrandClient};
///
/// let client = StrandClient::new(ClientConfig::new("http://localhost:8080"))?;
/// let folders = client.folders("").await?;
/// let songs = client.songs("Jazz").await?;
/// println!("{}", client.stream_url(&songs[0].path));
/// ```
#[derive(Debug, Clone)]
pub struct StrandClient {
    http: Client,
    base_url: String,
}

impl StrandClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let base_url = config.url.trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Strand/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Get the normalized server URL.
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// List the subfolders of `dir` (empty string for the music root).
    pub async fn folders(&self, dir: &str) -> Result<Vec<FolderEntry>> {
        self.get_list(&self.endpoint("folders", "dir", dir)).await
    }

    /// List the playable songs in `dir`.
    pub async fn songs(&self, dir: &str) -> Result<Vec<SongEntry>> {
        self.get_list(&self.endpoint("list", "dir", dir)).await
    }

    /// URL that streams the audio file at `path`.
    pub fn stream_url(&self, path: &str) -> String {
        self.endpoint("stream", "file", path)
    }

    fn endpoint(&self, route: &str, key: &str, value: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
        format!("{}/{}?{}={}", self.base_url, route, key, encoded)
    }

    /// GET a JSON array, treating any other JSON value as empty.
    async fn get_list<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        debug!(url = %url, "Fetching listing");

        let response = self.http.get(url).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                ClientError::ServerUnreachable(e.to_string())
            } else {
                ClientError::Request(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "Listing request failed");
            return Err(ClientError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.text().await?;
        let value: Value = serde_json::from_str(&body)
            .map_err(|e| ClientError::Parse(format!("Invalid listing JSON: {}", e)))?;

        match value {
            Value::Array(_) => serde_json::from_value(value)
                .map_err(|e| ClientError::Parse(format!("Unexpected listing entry: {}", e))),
            other => {
                debug!(url = %url, kind = %json_kind(&other), "Listing is not an array, using empty list");
                Ok(Vec::new())
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait(?Send)]
impl ListingSource for StrandClient {
    async fn list_folders(&self, dir: &str) -> strand_playback::Result<Vec<FolderEntry>> {
        Ok(self.folders(dir).await?)
    }

    async fn list_songs(&self, dir: &str) -> strand_playback::Result<Vec<SongEntry>> {
        Ok(self.songs(dir).await?)
    }

    fn stream_url(&self, path: &str) -> String {
        StrandClient::stream_url(self, path)
    }
}
