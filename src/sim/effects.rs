//! Side effects requested by the engine
//!
//! The simulation never touches audio or navigation directly. It appends
//! [`Effect`]s to an outbox which the host drains once per frame.

use serde::{Deserialize, Serialize};

/// Sound effect cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sfx {
    /// A block appears on the board
    BlockPlaced,
    /// Spawn particles start converging
    Swoop,
    /// The ball materializes
    Materialize,
    /// Ball hits paddle
    PaddleHit,
    /// Ball breaks a block
    BlockBreak,
    /// Ball bounces off a wall
    WallHit,
    /// Ball drops through the bottom
    BallLost,
}

/// Music tracks the engine can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MusicTrack {
    /// Shuffled in-game playlist
    Background,
    Menu,
    EndScreen,
}

/// Screens the host application can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Screen {
    Menu,
    Game,
    EndScreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Sfx(Sfx),
    StartMusic(MusicTrack),
    StopMusic,
    Navigate(Screen),
}

/// Effect outbox, drained by the host
#[derive(Debug, Clone, Default)]
pub struct Effects {
    queue: Vec<Effect>,
}

impl Effects {
    pub fn push(&mut self, effect: Effect) {
        self.queue.push(effect);
    }

    pub fn sfx(&mut self, sfx: Sfx) {
        self.push(Effect::Sfx(sfx));
    }

    pub fn drain(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.queue)
    }

    pub fn pending(&self) -> &[Effect] {
        &self.queue
    }
}
