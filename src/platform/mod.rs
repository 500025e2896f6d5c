//! Platform glue
//!
//! Routes engine effects to the host: audio through an [`AudioManager`],
//! screen changes through a [`Navigator`]. The browser binding lives in `web`.

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::audio::{AudioBackend, AudioManager};
use crate::sim::{Effect, MusicTrack, Screen, Session};

/// Whatever shows screens to the player
pub trait Navigator {
    fn navigate(&mut self, screen: Screen);
}

/// Music a screen plays when it opens
pub fn screen_music(screen: Screen) -> Option<MusicTrack> {
    match screen {
        Screen::Menu => Some(MusicTrack::Menu),
        Screen::EndScreen => Some(MusicTrack::EndScreen),
        // The match starts its own playlist
        Screen::Game => None,
    }
}

/// In-memory navigator keeping the screen history
#[derive(Debug, Clone)]
pub struct Router {
    current: Screen,
    history: Vec<Screen>,
}

impl Default for Router {
    fn default() -> Self {
        Self {
            current: Screen::Menu,
            history: Vec::new(),
        }
    }
}

impl Router {
    pub fn current(&self) -> Screen {
        self.current
    }

    /// Screens visited before the current one, oldest first
    pub fn history(&self) -> &[Screen] {
        &self.history
    }
}

impl Navigator for Router {
    fn navigate(&mut self, screen: Screen) {
        if screen == self.current {
            return;
        }
        log::info!("Navigating {:?} -> {:?}", self.current, screen);
        self.history.push(self.current);
        self.current = screen;
    }
}

/// Hand a frame's effects to their collaborators
pub fn route_effects<B, N>(effects: Vec<Effect>, audio: &mut AudioManager<B>, navigator: &mut N)
where
    B: AudioBackend,
    N: Navigator,
{
    for effect in effects {
        match effect {
            Effect::Navigate(screen) => {
                navigator.navigate(screen);
                if let Some(track) = screen_music(screen) {
                    audio.play_music(track);
                }
            }
            other => audio.apply(other),
        }
    }
}

/// Final numbers for the end screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndSummary {
    pub score: u64,
    pub high_score: u64,
    pub level: u32,
    pub new_best: bool,
}

impl EndSummary {
    pub fn from_session(session: &Session) -> Self {
        Self {
            score: session.score(),
            high_score: session.high_score(),
            level: session.level(),
            new_best: session.is_new_best(),
        }
    }

    pub fn title(&self) -> &'static str {
        if self.new_best { "WELL DONE!" } else { "GAME OVER" }
    }
}
