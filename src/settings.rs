//! Game settings and tuning
//!
//! Every field has a default, so a settings document only needs the values it
//! changes. Persisted in LocalStorage on the web; natively read from the file
//! named by `BREAKOUT_SETTINGS`.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::AudioSettings;
use crate::consts::*;
use crate::sim::{BoardConfig, GameplayConfig, SpawnerConfig};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Playfield size in pixels
    pub width: f32,
    pub height: f32,
    pub starting_lives: u32,
    /// Match RNG seed; random when unset
    pub seed: Option<u64>,

    pub paddle_size: Vec2,
    /// Paddle centre distance from the bottom edge
    pub paddle_offset_y: f32,

    pub board: BoardConfig,
    pub spawner: SpawnerConfig,
    pub gameplay: GameplayConfig,
    pub audio: AudioSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
            starting_lives: STARTING_LIVES,
            seed: None,
            paddle_size: Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT),
            paddle_offset_y: PADDLE_OFFSET_Y,
            board: BoardConfig::default(),
            spawner: SpawnerConfig::default(),
            gameplay: GameplayConfig::default(),
            audio: AudioSettings::default(),
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "breakout_settings";

    /// Environment variable naming the native settings file
    pub const PATH_ENV: &'static str = "BREAKOUT_SETTINGS";

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(SettingsError::Invalid(format!(
                "playfield must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.starting_lives == 0 {
            return Err(SettingsError::Invalid("starting_lives must be at least 1".into()));
        }
        if self.board.blocks_per_row == 0 {
            return Err(SettingsError::Invalid("board.blocks_per_row must be at least 1".into()));
        }
        if self.spawner.particle_count == 0 {
            return Err(SettingsError::Invalid("spawner.particle_count must be at least 1".into()));
        }
        if self.paddle_size.x <= 0.0 || self.paddle_size.y <= 0.0 {
            return Err(SettingsError::Invalid("paddle_size must be positive".into()));
        }
        Ok(())
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match self.to_json() {
                Ok(json) => {
                    if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                        log::warn!("Failed to write settings to LocalStorage");
                    } else {
                        log::info!("Settings saved");
                    }
                }
                Err(e) => log::warn!("Failed to serialize settings: {}", e),
            }
        }
    }

    /// Load settings from the file named by `BREAKOUT_SETTINGS`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::PATH_ENV) else {
            log::info!("Using default settings");
            return Self::default();
        };
        match Self::read_file(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path);
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings file {}: {}", path, e);
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn read_file(path: impl AsRef<std::path::Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write settings back to the `BREAKOUT_SETTINGS` file, if one is set
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        let Ok(path) = std::env::var(Self::PATH_ENV) else {
            return;
        };
        let result = self
            .to_json()
            .and_then(|json| std::fs::write(&path, json).map_err(SettingsError::from));
        match result {
            Ok(()) => log::info!("Settings saved to {}", path),
            Err(e) => log::warn!("Failed to save settings to {}: {}", path, e),
        }
    }
}
