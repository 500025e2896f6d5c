//! Sound effect and music routing
//!
//! The engine only emits [`Effect`]s; [`AudioManager`] turns them into
//! backend calls. Playback is best-effort: backend failures are logged and
//! swallowed, never surfaced to the game.

#[cfg(target_arch = "wasm32")]
pub mod web;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{Effect, MusicTrack, Sfx};

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("unknown sound: {0}")]
    UnknownKey(String),
    #[error("playback failed: {0}")]
    Playback(String),
}

/// Audio preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub play_sfx: bool,
    pub play_music: bool,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            play_sfx: true,
            play_music: false,
            music_volume: 0.5,
        }
    }
}

/// Sound asset key for a cue
pub fn sfx_key(sfx: Sfx) -> &'static str {
    match sfx {
        Sfx::BlockPlaced => "thwup",
        Sfx::Swoop => "swoop",
        Sfx::Materialize => "plomp",
        Sfx::PaddleHit => "ploomp",
        Sfx::BlockBreak => "thwong",
        Sfx::WallHit => "klup",
        Sfx::BallLost => "bunzz",
    }
}

/// Asset key for a fixed music track
pub fn music_key(track: MusicTrack) -> Option<&'static str> {
    match track {
        MusicTrack::Menu => Some("menu"),
        MusicTrack::EndScreen => Some("endscreen"),
        MusicTrack::Background => None,
    }
}

/// In-game playlist, shuffled without repeats
pub const BACKGROUND_TRACKS: [&str; 7] = [
    "chasing", "whispering", "gold", "horizon", "neon", "dreams", "whisper",
];

/// Something that can actually make noise
pub trait AudioBackend {
    fn play_sfx(&mut self, key: &str) -> Result<(), AudioError>;
    /// Start a music track, replacing whatever is playing
    fn play_music(&mut self, key: &str, volume: f32) -> Result<(), AudioError>;
    fn stop_music(&mut self);
    /// Whether the current music track played to its end
    fn music_ended(&self) -> bool {
        false
    }
}

/// Backend that only logs; used natively and headless
#[derive(Debug, Default)]
pub struct LogBackend;

impl AudioBackend for LogBackend {
    fn play_sfx(&mut self, key: &str) -> Result<(), AudioError> {
        log::trace!("sfx {}", key);
        Ok(())
    }

    fn play_music(&mut self, key: &str, volume: f32) -> Result<(), AudioError> {
        log::debug!("music {} (volume {:.2})", key, volume);
        Ok(())
    }

    fn stop_music(&mut self) {
        log::debug!("music stopped");
    }
}

/// What music should be playing, remembered across stops so it can resume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicState {
    None,
    Music(MusicTrack),
    Background,
}

pub struct AudioManager<B: AudioBackend> {
    backend: B,
    settings: AudioSettings,
    music_state: MusicState,
    /// Key of the track currently playing
    current: Option<&'static str>,
    /// Background tracks not yet played this cycle
    playlist: Vec<&'static str>,
    rng: Pcg32,
}

impl<B: AudioBackend> AudioManager<B> {
    pub fn new(backend: B, settings: AudioSettings, seed: u64) -> Self {
        Self {
            backend,
            settings,
            music_state: MusicState::None,
            current: None,
            playlist: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    pub fn music_state(&self) -> MusicState {
        self.music_state
    }

    pub fn current_track(&self) -> Option<&'static str> {
        self.current
    }

    pub fn set_play_sfx(&mut self, enabled: bool) {
        self.settings.play_sfx = enabled;
    }

    /// Toggle music; turning it off silences the current track
    pub fn set_play_music(&mut self, enabled: bool) {
        let was_enabled = self.settings.play_music;
        self.settings.play_music = enabled;
        if was_enabled && !enabled && self.current.take().is_some() {
            self.backend.stop_music();
        }
    }

    pub fn play_sfx(&mut self, sfx: Sfx) {
        if !self.settings.play_sfx {
            return;
        }
        let key = sfx_key(sfx);
        if let Err(e) = self.backend.play_sfx(key) {
            log::warn!("Failed to play SFX \"{}\": {}", key, e);
        }
    }

    /// Start the shuffled playlist unless something is already playing
    pub fn start_background_music(&mut self) {
        if !self.settings.play_music || self.current.is_some() {
            return;
        }
        self.music_state = MusicState::Background;
        let key = self.next_background_track();
        self.start_track(key);
    }

    /// Loop a fixed track, replacing the current one
    pub fn play_music(&mut self, track: MusicTrack) {
        if track == MusicTrack::Background {
            self.start_background_music();
            return;
        }
        self.music_state = MusicState::Music(track);
        if !self.settings.play_music {
            return;
        }
        let Some(key) = music_key(track) else {
            return;
        };
        self.current = None;
        self.start_track(key);
    }

    /// Resume whatever was last asked for
    pub fn play_last_music(&mut self) {
        match self.music_state {
            MusicState::Music(track) => self.play_music(track),
            MusicState::Background => self.start_background_music(),
            MusicState::None => {}
        }
    }

    pub fn stop_music(&mut self) {
        if self.current.take().is_some() {
            self.music_state = MusicState::None;
            self.backend.stop_music();
        }
    }

    /// The current track finished: loop it, or move on through the playlist
    pub fn on_track_ended(&mut self) {
        if self.current.take().is_none() || !self.settings.play_music {
            return;
        }
        match self.music_state {
            MusicState::Background => self.start_background_music(),
            MusicState::Music(track) => self.play_music(track),
            MusicState::None => {}
        }
    }

    /// Poll the backend for finished tracks; call once per frame
    pub fn update(&mut self) {
        if self.current.is_some() && self.backend.music_ended() {
            self.on_track_ended();
        }
    }

    /// Route an engine effect; navigation is not ours
    pub fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Sfx(sfx) => self.play_sfx(sfx),
            Effect::StartMusic(track) => self.play_music(track),
            Effect::StopMusic => self.stop_music(),
            Effect::Navigate(_) => {}
        }
    }

    fn next_background_track(&mut self) -> &'static str {
        if self.playlist.is_empty() {
            self.playlist = BACKGROUND_TRACKS.to_vec();
        }
        let index = self.rng.random_range(0..self.playlist.len());
        self.playlist.swap_remove(index)
    }

    fn start_track(&mut self, key: &'static str) {
        match self.backend.play_music(key, self.settings.music_volume) {
            Ok(()) => self.current = Some(key),
            Err(e) => {
                log::warn!("Failed to play music \"{}\": {}", key, e);
                self.current = None;
            }
        }
    }
}
