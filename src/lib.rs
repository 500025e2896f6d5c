//! Breakout - staggered-animation brick breaker
//!
//! Core modules:
//! - `sim`: Match engine (state machine, sequencers, arcade physics)
//! - `audio`: Sound effect / music routing with a pluggable backend
//! - `platform`: Navigation and browser bindings
//! - `settings`: Data-driven tuning, loaded from JSON

pub mod audio;
pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions (4:3, the canvas is letterboxed by the host)
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Lives at the start of a match
    pub const STARTING_LIVES: u32 = 4;

    /// Board grid defaults
    pub const BLOCKS_PER_ROW: u32 = 15;
    pub const BLOCK_WIDTH: f32 = 48.0;
    pub const BLOCK_HEIGHT: f32 = 16.0;
    pub const BOARD_START_Y: f32 = 100.0;
    /// Rows on level 1 are `BASE_ROWS + 1`
    pub const BASE_ROWS: u32 = 5;
    pub const MAX_ROWS: u32 = 9;
    /// Number of distinct block visuals, assigned by `row % BLOCK_KINDS`
    pub const BLOCK_KINDS: u32 = 9;
    pub const BLOCK_STAGGER_MS: f32 = 50.0;
    pub const BLOCK_FADE_MS: f32 = 100.0;

    /// Delay before the first item of any sequence is revealed
    pub const SEQUENCE_START_DELAY_MS: f32 = 100.0;
    /// Fraction of an item's animation that counts as "settled" for the
    /// elapsed-time settle rule
    pub const SETTLE_FRACTION: f32 = 0.7;

    /// Ball spawn defaults
    pub const SPAWN_OFFSET_Y: f32 = 100.0;
    pub const SPAWN_PARTICLES: u32 = 16;
    pub const SPAWN_RADIUS: f32 = 120.0;
    pub const SPAWN_PARTICLE_MS: f32 = 1000.0;
    pub const SPAWN_STAGGER_MS: f32 = 30.0;
    pub const BALL_FADE_MS: f32 = 400.0;

    /// Ball sprite size (collider radius is half the smaller side)
    pub const BALL_WIDTH: f32 = 16.0;
    pub const BALL_HEIGHT: f32 = 16.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 96.0;
    pub const PADDLE_HEIGHT: f32 = 16.0;
    pub const PADDLE_OFFSET_Y: f32 = 50.0;
    /// Per-tick blend toward the pointer
    pub const PADDLE_FOLLOW: f32 = 0.15;

    /// Ball speed (pixels/s)
    pub const BALL_BASE_SPEED: f32 = 300.0;
    pub const BALL_SPEED_PER_LEVEL: f32 = 25.0;

    /// Launch band (degrees, screen space: -90 is straight up)
    pub const LAUNCH_MIN_DEG: f32 = -135.0;
    pub const LAUNCH_MAX_DEG: f32 = -45.0;

    /// Paddle bounce shaping
    pub const PADDLE_HIT_CLAMP: f32 = 0.8;
    pub const PADDLE_BASE_DEG: f32 = -90.0;
    pub const PADDLE_MAX_DEFLECT_DEG: f32 = 60.0;

    /// Scoring
    pub const BLOCK_POINTS: u64 = 10;
    pub const LEVEL_CLEAR_POINTS: u64 = 1000;

    /// Ball is lost once it is this far below the playfield
    pub const GUTTER_MARGIN: f32 = 50.0;
    pub const GUTTER_SIGNAL_DELAY_MS: f32 = 100.0;
    pub const GAME_OVER_DELAY_MS: f32 = 1000.0;

    /// Block destruction burst
    pub const BURST_PARTICLES: u32 = 5;
    pub const BURST_MIN_SPEED: f32 = 50.0;
    pub const BURST_MAX_SPEED: f32 = 150.0;
    pub const BURST_LIFESPAN_MS: f32 = 300.0;
    pub const BURST_CLEANUP_MS: f32 = 500.0;

    /// Largest frame delta the engine will integrate in one tick
    pub const MAX_FRAME_MS: f32 = 100.0;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Unit vector for an angle in degrees (screen space, y down)
#[inline]
pub fn direction_deg(deg: f32) -> Vec2 {
    let rad = deg.to_radians();
    Vec2::new(rad.cos(), rad.sin())
}

/// Angle of a vector in degrees (screen space, y down)
#[inline]
pub fn angle_deg(v: Vec2) -> f32 {
    v.y.atan2(v.x).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 100.0, 0.15), 15.0);
        assert_eq!(lerp(50.0, 50.0, 0.5), 50.0);
    }

    #[test]
    fn test_direction_round_trip() {
        let v = direction_deg(-90.0);
        assert!(v.x.abs() < 1e-5);
        assert!((v.y + 1.0).abs() < 1e-5);
        assert!((angle_deg(v) + 90.0).abs() < 1e-3);
    }
}
