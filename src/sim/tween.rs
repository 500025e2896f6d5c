//! Property tweens for sprite-like entities
//!
//! A tween interpolates position, scale and opacity from a start pose to a
//! target pose over a fixed duration. Time is in milliseconds.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Easing curves used by the sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    /// Cubic ease-out
    Power2,
    /// Overshoots the target slightly, then settles
    BackOut,
}

impl Easing {
    /// Map linear progress `t` in [0, 1] onto the curve
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Power2 => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Easing::BackOut => {
                const OVERSHOOT: f32 = 1.70158;
                let t = t - 1.0;
                t * t * ((OVERSHOOT + 1.0) * t + OVERSHOOT) + 1.0
            }
        }
    }
}

/// Visual pose of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub pos: Vec2,
    pub scale: f32,
    pub alpha: f32,
}

impl Sprite {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            scale: 1.0,
            alpha: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    fn lerp(&self, to: &Sprite, t: f32) -> Sprite {
        Sprite {
            pos: self.pos.lerp(to.pos, t),
            scale: crate::lerp(self.scale, to.scale, t),
            alpha: crate::lerp(self.alpha, to.alpha, t),
        }
    }
}

/// A running tween between two poses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tween {
    from: Sprite,
    to: Sprite,
    duration_ms: f32,
    elapsed_ms: f32,
    easing: Easing,
}

impl Tween {
    pub fn new(from: Sprite, to: Sprite, duration_ms: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration_ms: duration_ms.max(0.0),
            elapsed_ms: 0.0,
            easing,
        }
    }

    /// Progress (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Current interpolated pose
    pub fn value(&self) -> Sprite {
        self.from.lerp(&self.to, self.easing.apply(self.progress()))
    }

    /// Advance by `dt_ms` and return the new pose
    pub fn tick(&mut self, dt_ms: f32) -> Sprite {
        self.elapsed_ms = (self.elapsed_ms + dt_ms).min(self.duration_ms);
        self.value()
    }
}
