//! Match state machine
//!
//! States, events and the transition table. The table is the single source
//! of truth for which events a state accepts; entry actions live with the
//! orchestrator in `game.rs`.

use serde::{Deserialize, Serialize};

/// Current phase of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchState {
    /// New game: counters reset
    Start,
    /// Blocks fading in
    BuildBoard,
    /// Spawn particles converging, then the ball materializes
    SpawnBall,
    /// Active play
    GamePlay,
    /// A ball was lost, decide between another ball and game over
    CheckGameOver,
    /// Lives exhausted
    GameOver,
}

/// Events that drive transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchEvent {
    BoardBuild,
    BallSpawn,
    GamePlay,
    BoardClear,
    BallGutter,
    GameEnd,
}

impl MatchEvent {
    pub fn name(&self) -> &'static str {
        match self {
            MatchEvent::BoardBuild => "board.build",
            MatchEvent::BallSpawn => "ball.spawn",
            MatchEvent::GamePlay => "game.play",
            MatchEvent::BoardClear => "board.clear",
            MatchEvent::BallGutter => "ball.gutter",
            MatchEvent::GameEnd => "game.end",
        }
    }
}

/// (from, event, to)
pub static TRANSITIONS: [(MatchState, MatchEvent, MatchState); 7] = [
    (MatchState::Start, MatchEvent::BoardBuild, MatchState::BuildBoard),
    (MatchState::BuildBoard, MatchEvent::BallSpawn, MatchState::SpawnBall),
    (MatchState::SpawnBall, MatchEvent::GamePlay, MatchState::GamePlay),
    (MatchState::GamePlay, MatchEvent::BoardClear, MatchState::BuildBoard),
    (MatchState::GamePlay, MatchEvent::BallGutter, MatchState::CheckGameOver),
    (MatchState::CheckGameOver, MatchEvent::GameEnd, MatchState::GameOver),
    (MatchState::CheckGameOver, MatchEvent::BallSpawn, MatchState::SpawnBall),
];

/// Look up the target of `event` in `state`, if the event is legal there
pub fn next_state(state: MatchState, event: MatchEvent) -> Option<MatchState> {
    TRANSITIONS
        .iter()
        .find(|(from, on, _)| *from == state && *on == event)
        .map(|(_, _, to)| *to)
}

impl MatchState {
    /// Events this state reacts to
    pub fn accepts(self) -> impl Iterator<Item = MatchEvent> {
        TRANSITIONS
            .iter()
            .filter(move |(from, _, _)| *from == self)
            .map(|(_, on, _)| *on)
    }

    pub fn is_terminal(self) -> bool {
        self.accepts().next().is_none()
    }

    /// Whether a component consumes frame time in this state
    pub fn is_ticking(self) -> bool {
        matches!(
            self,
            MatchState::BuildBoard | MatchState::SpawnBall | MatchState::GamePlay
        )
    }
}
