//! Collision detection and response for the rectangular playfield
//!
//! Arcade-style only: the ball is a circle, paddle and blocks are axis-aligned
//! rectangles, and response is a plain reflection about the contact normal.
//! There is no continuous detection; a fast enough ball can tunnel.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle described by its centre and half extents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub center: Vec2,
    pub half: Vec2,
}

impl Rect {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half: size * 0.5,
        }
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }
}

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Collision point on the rectangle surface (if hit)
    pub point: Vec2,
    /// Surface normal at collision (pointing toward ball center, for reflection)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check collision between a ball and a rectangle
pub fn ball_rect_collision(ball_pos: Vec2, ball_radius: f32, rect: &Rect) -> CollisionResult {
    let closest = ball_pos.clamp(rect.min(), rect.max());
    let delta = ball_pos - closest;
    let dist_sq = delta.length_squared();

    if dist_sq > ball_radius * ball_radius {
        return CollisionResult::miss();
    }

    if dist_sq > f32::EPSILON {
        let dist = dist_sq.sqrt();
        return CollisionResult {
            hit: true,
            point: closest,
            normal: delta / dist,
            penetration: ball_radius - dist,
        };
    }

    // Centre is inside the rectangle: push out along the shallowest axis
    let local = ball_pos - rect.center;
    let overlap = rect.half - local.abs();
    if overlap.x < overlap.y {
        let sign = if local.x < 0.0 { -1.0 } else { 1.0 };
        CollisionResult {
            hit: true,
            point: Vec2::new(rect.center.x + sign * rect.half.x, ball_pos.y),
            normal: Vec2::new(sign, 0.0),
            penetration: overlap.x + ball_radius,
        }
    } else {
        let sign = if local.y < 0.0 { -1.0 } else { 1.0 };
        CollisionResult {
            hit: true,
            point: Vec2::new(ball_pos.x, rect.center.y + sign * rect.half.y),
            normal: Vec2::new(0.0, sign),
            penetration: overlap.y + ball_radius,
        }
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Which playfield edges a ball is touching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundsHit {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl BoundsHit {
    pub fn any(&self) -> bool {
        self.left || self.right || self.top || self.bottom
    }
}

/// Check the ball against the four playfield edges
///
/// Whether an edge actually blocks the ball is up to the ball's
/// `WorldBounds`; the bottom edge is normally open.
pub fn ball_bounds_collision(ball_pos: Vec2, ball_radius: f32, width: f32, height: f32) -> BoundsHit {
    BoundsHit {
        left: ball_pos.x - ball_radius <= 0.0,
        right: ball_pos.x + ball_radius >= width,
        top: ball_pos.y - ball_radius <= 0.0,
        bottom: ball_pos.y + ball_radius >= height,
    }
}

/// Check if the ball has dropped below the playfield by more than `margin`
pub fn ball_in_gutter(ball_pos: Vec2, height: f32, margin: f32) -> bool {
    ball_pos.y > height + margin
}
