//! JavaScript facade over `PlayerController`

use super::{FetchListing, HtmlAudioSink};
use crate::{
    controller::PlayerController,
    events::media_channel,
    state::{Action, PlayerState},
    time::format_time,
    types::PlaybackConfig,
};
use futures_util::lock::Mutex;
use js_sys::{Function, Promise};
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::HtmlAudioElement;

type Controller = PlayerController<FetchListing, HtmlAudioSink>;

/// Listener invoked with a state snapshot after every change
type Listener = Rc<RefCell<Option<Function>>>;

/// Browser music player
///
/// Every operation returns a promise resolving to the new state snapshot.
#[wasm_bindgen]
pub struct WasmPlayer {
    inner: Rc<Mutex<Controller>>,
    listing: FetchListing,
    on_change: Listener,
}

#[wasm_bindgen]
impl WasmPlayer {
    /// Create a player streaming through `audio` from `base_url`
    ///
    /// Pass an empty base URL to talk to the origin the page came from.
    #[wasm_bindgen(constructor)]
    pub fn new(audio: HtmlAudioElement, base_url: String) -> Self {
        console_error_panic_hook::set_once();

        let (tx, mut rx) = media_channel();
        let sink = HtmlAudioSink::new(audio, tx);
        let listing = FetchListing::new(base_url);
        let controller =
            PlayerController::new(listing.clone(), Some(sink), PlaybackConfig::default());

        let inner = Rc::new(Mutex::new(controller));
        let on_change: Listener = Rc::new(RefCell::new(None));

        // Media events are folded in one at a time, in arrival order
        let pump = Rc::clone(&inner);
        let listener = Rc::clone(&on_change);
        spawn_local(async move {
            while let Some(event) = rx.recv().await {
                let mut controller = pump.lock().await;
                controller.handle_media_event(event).await;
                if let Ok(snapshot) = snapshot(controller.state()) {
                    drop(controller);
                    notify(&listener, &snapshot);
                }
            }
        });

        Self {
            inner,
            listing,
            on_change,
        }
    }

    /// Register the state change callback
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: Function) {
        *self.on_change.borrow_mut() = Some(callback);
    }

    #[wasm_bindgen(js_name = browseRoot)]
    pub fn browse_root(&self) -> Promise {
        self.dispatch(Action::BrowseRoot)
    }

    #[wasm_bindgen(js_name = enterFolder)]
    pub fn enter_folder(&self, path: String) -> Promise {
        self.dispatch(Action::EnterFolder { path })
    }

    #[wasm_bindgen(js_name = goUp)]
    pub fn go_up(&self) -> Promise {
        self.dispatch(Action::GoUp)
    }

    #[wasm_bindgen(js_name = playSongAtIndex)]
    pub fn play_song_at_index(&self, index: i32) -> Promise {
        self.dispatch(Action::PlaySongAtIndex(index as isize))
    }

    pub fn next(&self) -> Promise {
        self.dispatch(Action::Next)
    }

    pub fn previous(&self) -> Promise {
        self.dispatch(Action::Previous)
    }

    #[wasm_bindgen(js_name = toggleShuffle)]
    pub fn toggle_shuffle(&self) -> Promise {
        self.dispatch(Action::ToggleShuffle)
    }

    #[wasm_bindgen(js_name = togglePlayPause)]
    pub fn toggle_play_pause(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        let listing = self.listing.clone();
        let listener = Rc::clone(&self.on_change);

        future_to_promise(async move {
            // The paused flag is read under the lock so it matches the state it is applied to
            let action = inner.lock().await.play_pause_action();
            match action {
                Some(action) => run(&inner, &listing, &listener, action).await,
                None => publish(&inner, &listener).await,
            }
        })
    }

    /// Seek to position in seconds
    pub fn seek(&self, position: f64) -> Promise {
        self.dispatch(Action::Seek(position))
    }

    /// Set volume (0.0 - 1.0)
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, level: f64) -> Promise {
        self.dispatch(Action::SetVolume(level))
    }

    #[wasm_bindgen(js_name = setMuted)]
    pub fn set_muted(&self, muted: bool) -> Promise {
        self.dispatch(Action::SetMuted(muted))
    }

    #[wasm_bindgen(js_name = clearError)]
    pub fn clear_error(&self) -> Promise {
        self.dispatch(Action::ClearError)
    }

    fn dispatch(&self, action: Action) -> Promise {
        let inner = Rc::clone(&self.inner);
        let listing = self.listing.clone();
        let listener = Rc::clone(&self.on_change);

        future_to_promise(async move { run(&inner, &listing, &listener, action).await })
    }
}

/// Apply `action`, then await its listing fetches without holding the lock
///
/// Media events and other actions are applied while the fetches are in
/// flight. A navigation superseded in the meantime has its results discarded.
async fn run(
    inner: &Mutex<Controller>,
    listing: &FetchListing,
    listener: &Listener,
    action: Action,
) -> Result<JsValue, JsValue> {
    let mut pending = inner.lock().await.begin(action);
    if !pending.is_empty() {
        // Publish the loading state before the fetches start
        publish(inner, listener).await?;
    }

    while !pending.is_empty() {
        let results = pending.run(listing).await;
        pending = inner.lock().await.complete(results);
    }

    publish(inner, listener).await
}

/// Snapshot the state and hand it to the change listener
async fn publish(inner: &Mutex<Controller>, listener: &Listener) -> Result<JsValue, JsValue> {
    let state = snapshot(inner.lock().await.state())?;
    notify(listener, &state);
    Ok(state)
}

/// Format seconds as `m:ss`
#[wasm_bindgen(js_name = formatTime)]
pub fn format_time_js(seconds: f64) -> String {
    format_time(seconds)
}

fn snapshot(state: &PlayerState) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(state).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn notify(listener: &Listener, state: &JsValue) {
    if let Some(ref cb) = *listener.borrow() {
        cb.call1(&JsValue::NULL, state).ok();
    }
}
