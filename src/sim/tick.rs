//! Per-frame tick
//!
//! Hosts call [`tick`] once per rendered frame with the frame delta. Long
//! frames are clamped so a backgrounded tab does not integrate a huge step.

use super::game::Game;
use crate::consts::MAX_FRAME_MS;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer x in playfield space (mouse/touch)
    pub pointer_x: Option<f32>,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the match by one frame of `dt_ms` milliseconds
pub fn tick(game: &mut Game, input: &TickInput, dt_ms: f32) {
    if game.is_stopped() {
        return;
    }

    if input.pause {
        let paused = game.session().is_paused();
        game.set_paused(!paused);
    }

    // Don't tick if paused
    if game.session().is_paused() {
        return;
    }

    if let Some(x) = input.pointer_x {
        game.set_pointer(x);
    }

    let dt_ms = dt_ms.clamp(0.0, MAX_FRAME_MS);
    game.advance(dt_ms);
}
