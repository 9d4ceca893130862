//! `MediaSink` backed by an HTML audio element

use super::js_message;
use crate::{
    error::{PlaybackError, Result},
    events::{MediaEvent, MediaEventSender},
    source::MediaSink,
};
use wasm_bindgen::{closure::Closure, JsCast};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::HtmlAudioElement;

/// Streams through a single `<audio>` element
///
/// Native media events are forwarded to the controller's channel. The
/// handlers are detached again when the sink is dropped.
pub struct HtmlAudioSink {
    audio: HtmlAudioElement,
    events: MediaEventSender,
    _listeners: Vec<Closure<dyn FnMut()>>,
}

impl HtmlAudioSink {
    pub fn new(audio: HtmlAudioElement, events: MediaEventSender) -> Self {
        let mut listeners = Vec::new();

        let forward = |event: fn(&HtmlAudioElement) -> MediaEvent| {
            let audio = audio.clone();
            let tx = events.clone();
            Closure::wrap(Box::new(move || {
                // Receiver gone means the player was dropped
                let _ = tx.send(event(&audio));
            }) as Box<dyn FnMut()>)
        };

        let timeupdate = forward(|a| MediaEvent::TimeUpdate(a.current_time()));
        audio.set_ontimeupdate(Some(timeupdate.as_ref().unchecked_ref()));
        listeners.push(timeupdate);

        let durationchange = forward(|a| MediaEvent::DurationChange(a.duration()));
        audio.set_ondurationchange(Some(durationchange.as_ref().unchecked_ref()));
        listeners.push(durationchange);

        let play = forward(|_| MediaEvent::Play);
        audio.set_onplay(Some(play.as_ref().unchecked_ref()));
        listeners.push(play);

        let pause = forward(|_| MediaEvent::Pause);
        audio.set_onpause(Some(pause.as_ref().unchecked_ref()));
        listeners.push(pause);

        let ended = forward(|_| MediaEvent::Ended);
        audio.set_onended(Some(ended.as_ref().unchecked_ref()));
        listeners.push(ended);

        let volumechange = forward(|a| MediaEvent::VolumeChange {
            volume: a.volume(),
            muted: a.muted(),
        });
        audio.set_onvolumechange(Some(volumechange.as_ref().unchecked_ref()));
        listeners.push(volumechange);

        let error = forward(|a| {
            let message = a
                .error()
                .map(|e| {
                    let message = e.message();
                    if message.is_empty() {
                        format!("media error code {}", e.code())
                    } else {
                        message
                    }
                })
                .unwrap_or_else(|| "media error".to_string());
            MediaEvent::Error(message)
        });
        audio.set_onerror(Some(error.as_ref().unchecked_ref()));
        listeners.push(error);

        Self {
            audio,
            events,
            _listeners: listeners,
        }
    }

    pub fn element(&self) -> &HtmlAudioElement {
        &self.audio
    }
}

impl MediaSink for HtmlAudioSink {
    fn load(&mut self, url: &str) -> Result<()> {
        self.audio.set_src(url);
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        let promise = self
            .audio
            .play()
            .map_err(|e| PlaybackError::PlaybackStart(js_message(&e)))?;

        // Autoplay refusals settle later, report them through the channel
        let tx = self.events.clone();
        spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                let _ = tx.send(MediaEvent::Error(js_message(&err)));
            }
        });
        Ok(())
    }

    fn pause(&mut self) {
        let _ = self.audio.pause();
    }

    fn is_paused(&self) -> bool {
        self.audio.paused()
    }

    fn seek(&mut self, position: f64) {
        self.audio.set_current_time(position);
    }

    fn set_volume(&mut self, level: f64) {
        self.audio.set_volume(level);
    }

    fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
    }
}

impl Drop for HtmlAudioSink {
    fn drop(&mut self) {
        self.audio.set_ontimeupdate(None);
        self.audio.set_ondurationchange(None);
        self.audio.set_onplay(None);
        self.audio.set_onpause(None);
        self.audio.set_onended(None);
        self.audio.set_onvolumechange(None);
        self.audio.set_onerror(None);
    }
}
