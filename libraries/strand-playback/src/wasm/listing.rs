//! `ListingSource` over the browser's `fetch`

use super::js_message;
use crate::{
    error::{PlaybackError, Result},
    source::ListingSource,
    types::{FolderEntry, SongEntry},
};
use async_trait::async_trait;
use js_sys::{encode_uri_component, Array};
use serde::de::DeserializeOwned;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

/// Lists folders and songs from the music server the page was served with
///
/// An empty base URL issues same-origin relative requests.
#[derive(Debug, Clone, Default)]
pub struct FetchListing {
    base_url: String,
}

impl FetchListing {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, route: &str, key: &str, value: &str) -> String {
        format!(
            "{}/{}?{}={}",
            self.base_url,
            route,
            key,
            String::from(encode_uri_component(value))
        )
    }

    async fn get_list<T: DeserializeOwned>(&self, url: String) -> Result<Vec<T>> {
        let window = web_sys::window()
            .ok_or_else(|| PlaybackError::Listing("no window available".to_string()))?;

        let response: Response = JsFuture::from(window.fetch_with_str(&url))
            .await
            .and_then(JsValue::dyn_into)
            .map_err(|e| PlaybackError::Listing(js_message(&e)))?;

        if !response.ok() {
            return Err(PlaybackError::Listing(format!(
                "HTTP {}: {}",
                response.status(),
                response.status_text()
            )));
        }

        let body = response
            .json()
            .map_err(|e| PlaybackError::Listing(js_message(&e)))?;
        let json = JsFuture::from(body)
            .await
            .map_err(|e| PlaybackError::Listing(js_message(&e)))?;

        // Anything other than an array is treated as an empty listing
        if !Array::is_array(&json) {
            return Ok(Vec::new());
        }

        serde_wasm_bindgen::from_value(json).map_err(|e| PlaybackError::Listing(e.to_string()))
    }
}

#[async_trait(?Send)]
impl ListingSource for FetchListing {
    async fn list_folders(&self, dir: &str) -> Result<Vec<FolderEntry>> {
        self.get_list(self.endpoint("folders", "dir", dir)).await
    }

    async fn list_songs(&self, dir: &str) -> Result<Vec<SongEntry>> {
        self.get_list(self.endpoint("list", "dir", dir)).await
    }

    fn stream_url(&self, path: &str) -> String {
        self.endpoint("stream", "file", path)
    }
}
