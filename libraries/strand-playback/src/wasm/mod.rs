//! Browser bindings for strand-playback
//!
//! An `HtmlAudioElement` media sink, a `fetch`-based listing backend and the
//! `WasmPlayer` facade exported to JavaScript.

mod listing;
mod player;
mod sink;

pub use listing::FetchListing;
pub use player::WasmPlayer;
pub use sink::HtmlAudioSink;

use wasm_bindgen::{JsCast, JsValue};

/// Best-effort human readable message for a thrown JS value
pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
