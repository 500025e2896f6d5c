//! Browser playback through `HtmlAudioElement`

use std::collections::HashMap;

use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::HtmlAudioElement;

use super::{AudioBackend, AudioError};

/// Asset path for a sound key
fn asset_path(key: &str) -> Option<&'static str> {
    Some(match key {
        // SFX
        "thwup" => "/assets/sounds/eleven/thwup.mp3",
        "swoop" => "/assets/sounds/eleven/swoopin.mp3",
        "plomp" => "/assets/sounds/eleven/plomp.mp3",
        "ploomp" => "/assets/sounds/eleven/ploomp.mp3",
        "thwong" => "/assets/sounds/eleven/thwong.mp3",
        "klup" => "/assets/sounds/eleven/klup.mp3",
        "bunzz" => "/assets/sounds/eleven/bunzz.mp3",
        // Music
        "menu" => "/assets/sounds/music/Ethereal_Journey.mp3",
        "endscreen" => "/assets/sounds/music/After_the_Glow.mp3",
        // Background playlist
        "chasing" => "/assets/sounds/background/Chasing_Horizons.mp3",
        "whispering" => "/assets/sounds/background/Whispered_Horizon.mp3",
        "gold" => "/assets/sounds/background/Waves_of_Gold.mp3",
        "horizon" => "/assets/sounds/background/Whispers_of_the_Horizon.mp3",
        "neon" => "/assets/sounds/background/Neon_Moon.mp3",
        "dreams" => "/assets/sounds/background/Neon_Dreams.mp3",
        "whisper" => "/assets/sounds/background/Whispers_in_Neon.mp3",
        _ => return None,
    })
}

fn new_element(key: &str) -> Result<HtmlAudioElement, AudioError> {
    let path = asset_path(key).ok_or_else(|| AudioError::UnknownKey(key.to_string()))?;
    HtmlAudioElement::new_with_src(path)
        .map_err(|e| AudioError::Playback(format!("{:?}", e)))
}

/// Start playback; autoplay rejections arrive asynchronously and are logged
fn start(element: &HtmlAudioElement, key: &str) -> Result<(), AudioError> {
    let promise = element
        .play()
        .map_err(|e| AudioError::Playback(format!("{:?}", e)))?;
    let key = key.to_string();
    spawn_local(async move {
        if let Err(e) = JsFuture::from(promise).await {
            log::warn!("Playback of \"{}\" rejected: {:?}", key, e);
        }
    });
    Ok(())
}

#[derive(Default)]
pub struct WebAudioBackend {
    /// Preloaded SFX, kept alive so their sources stay cached
    sfx: HashMap<String, HtmlAudioElement>,
    music: Option<HtmlAudioElement>,
}

impl WebAudioBackend {
    pub fn new() -> Self {
        let mut sfx = HashMap::new();
        for key in ["thwup", "swoop", "plomp", "ploomp", "thwong", "klup", "bunzz"] {
            match new_element(key) {
                Ok(element) => {
                    element.set_preload("auto");
                    sfx.insert(key.to_string(), element);
                }
                Err(e) => log::warn!("Failed to preload \"{}\": {}", key, e),
            }
        }
        Self { sfx, music: None }
    }
}

impl AudioBackend for WebAudioBackend {
    fn play_sfx(&mut self, key: &str) -> Result<(), AudioError> {
        if !self.sfx.contains_key(key) {
            return Err(AudioError::UnknownKey(key.to_string()));
        }
        // A fresh element per cue so cues can overlap
        let element = new_element(key)?;
        start(&element, key)
    }

    fn play_music(&mut self, key: &str, volume: f32) -> Result<(), AudioError> {
        self.stop_music();
        let element = new_element(key)?;
        element.set_volume(f64::from(volume.clamp(0.0, 1.0)));
        start(&element, key)?;
        self.music = Some(element);
        Ok(())
    }

    fn stop_music(&mut self) {
        if let Some(music) = self.music.take() {
            if music.pause().is_err() {
                log::warn!("Failed to pause music");
            }
        }
    }

    fn music_ended(&self) -> bool {
        self.music.as_ref().is_some_and(|m| m.ended())
    }
}
