//! Browser binding
//!
//! JS owns the render loop and the canvas; it calls [`WebGame::tick`] once per
//! animation frame and draws from [`WebGame::arena_json`].

use wasm_bindgen::prelude::*;

use super::{EndSummary, Navigator, Router, route_effects};
use crate::audio::AudioManager;
use crate::audio::web::WebAudioBackend;
use crate::settings::Settings;
use crate::sim::{Effect, Game, Screen, TickInput, tick};

#[wasm_bindgen]
pub struct WebGame {
    settings: Settings,
    game: Game,
    audio: AudioManager<WebAudioBackend>,
    router: Router,
    input: TickInput,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebGame {
        let mut settings = Settings::load();
        if settings.seed.is_none() {
            settings.seed = Some(js_sys::Date::now() as u64);
        }
        let game = Game::new(&settings);
        let audio = AudioManager::new(WebAudioBackend::new(), settings.audio.clone(), game.seed());
        log::info!("Game initialized with seed: {}", game.seed());
        WebGame {
            settings,
            game,
            audio,
            router: Router::default(),
            input: TickInput::default(),
        }
    }

    /// Begin a new match, replacing any previous one
    pub fn start(&mut self) {
        self.game.shutdown();
        let mut settings = self.settings.clone();
        settings.seed = Some(js_sys::Date::now() as u64);
        self.game = Game::new(&settings);
        self.audio.stop_music();
        self.router.navigate(Screen::Game);
        self.game.start();
        self.flush();
    }

    /// Advance one animation frame
    pub fn tick(&mut self, dt_ms: f32, pointer_x: Option<f32>) {
        self.input.pointer_x = pointer_x;
        tick(&mut self.game, &self.input, dt_ms);
        // One-shot inputs
        self.input.pause = false;
        self.audio.update();
        self.flush();
    }

    /// Toggle pause on the next tick
    pub fn toggle_pause(&mut self) {
        self.input.pause = true;
    }

    pub fn is_paused(&self) -> bool {
        self.game.session().is_paused()
    }

    pub fn score(&self) -> f64 {
        self.game.session().score() as f64
    }

    pub fn high_score(&self) -> f64 {
        self.game.session().high_score() as f64
    }

    pub fn lives(&self) -> u32 {
        self.game.session().lives()
    }

    pub fn max_lives(&self) -> u32 {
        self.game.session().max_lives()
    }

    pub fn level(&self) -> u32 {
        self.game.session().level()
    }

    pub fn state(&self) -> String {
        format!("{:?}", self.game.state())
    }

    pub fn screen(&self) -> String {
        format!("{:?}", self.router.current())
    }

    /// Title for the end screen
    pub fn end_title(&self) -> String {
        EndSummary::from_session(self.game.session()).title().to_string()
    }

    /// Every entity for the renderer, as JSON
    pub fn arena_json(&self) -> String {
        serde_json::to_string(self.game.arena()).unwrap_or_else(|e| {
            log::warn!("Failed to serialize arena: {}", e);
            String::from("{}")
        })
    }

    pub fn set_play_sfx(&mut self, enabled: bool) {
        self.audio.set_play_sfx(enabled);
        self.settings.audio.play_sfx = enabled;
        self.settings.save();
    }

    pub fn set_play_music(&mut self, enabled: bool) {
        self.audio.set_play_music(enabled);
        self.settings.audio.play_music = enabled;
        self.settings.save();
        if enabled && self.router.current() == Screen::Game {
            self.audio.play_last_music();
        }
    }

    /// Leave the match for a menu screen
    pub fn show_menu(&mut self) {
        self.game.shutdown();
        self.audio.stop_music();
        route_effects(
            vec![Effect::Navigate(Screen::Menu)],
            &mut self.audio,
            &mut self.router,
        );
    }

    pub fn shutdown(&mut self) {
        self.game.shutdown();
        self.audio.stop_music();
    }
}

impl WebGame {
    /// Route this frame's effects
    fn flush(&mut self) {
        let effects = self.game.drain_effects();
        route_effects(effects, &mut self.audio, &mut self.router);
    }
}

impl Default for WebGame {
    fn default() -> Self {
        Self::new()
    }
}
