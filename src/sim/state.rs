//! Playfield entities
//!
//! Everything a renderer needs to draw a frame lives in [`Arena`]; the
//! components mutate it, the presentation layer only reads it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::tween::{Sprite, Tween};
use crate::consts::*;

/// Block visuals, one per board row (wrapping after nine rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    Crimson,
    Amber,
    Gold,
    Lime,
    Emerald,
    Teal,
    Azure,
    Indigo,
    Violet,
}

impl BlockKind {
    pub const ALL: [BlockKind; BLOCK_KINDS as usize] = [
        BlockKind::Crimson,
        BlockKind::Amber,
        BlockKind::Gold,
        BlockKind::Lime,
        BlockKind::Emerald,
        BlockKind::Teal,
        BlockKind::Azure,
        BlockKind::Indigo,
        BlockKind::Violet,
    ];

    /// Visual for a board row
    pub fn for_row(row: u32) -> Self {
        Self::ALL[(row % BLOCK_KINDS) as usize]
    }

    /// Texture key (`block_01` .. `block_09`)
    pub fn texture(&self) -> &'static str {
        match self {
            BlockKind::Crimson => "block_01",
            BlockKind::Amber => "block_02",
            BlockKind::Gold => "block_03",
            BlockKind::Lime => "block_04",
            BlockKind::Emerald => "block_05",
            BlockKind::Teal => "block_06",
            BlockKind::Azure => "block_07",
            BlockKind::Indigo => "block_08",
            BlockKind::Violet => "block_09",
        }
    }
}

/// A destructible board cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: u32,
    pub row: u32,
    pub col: u32,
    pub kind: BlockKind,
    pub rect: Rect,
    pub sprite: Sprite,
    /// Fade-in, cleared once finished
    pub fade: Option<Tween>,
    /// Does not move when the ball hits it
    pub immovable: bool,
}

impl Block {
    /// Advance the fade-in; returns true on the tick it finishes
    pub fn tick_fade(&mut self, dt_ms: f32) -> bool {
        let Some(fade) = &mut self.fade else {
            return false;
        };
        self.sprite = fade.tick(dt_ms);
        if fade.is_finished() {
            self.fade = None;
            return true;
        }
        false
    }
}

/// Which world edges the ball bounces off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl WorldBounds {
    /// Every edge except the bottom one
    pub fn open_bottom() -> Self {
        Self {
            left: true,
            right: true,
            top: true,
            bottom: false,
        }
    }
}

/// The ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub sprite: Sprite,
    pub vel: Vec2,
    /// Visual size; the collider is a circle inscribed in it
    pub size: Vec2,
    pub radius: f32,
    /// Restitution on each axis
    pub bounce: Vec2,
    pub bounds: WorldBounds,
    /// Materialize animation, cleared once finished
    pub fade: Option<Tween>,
}

impl Ball {
    /// A motionless, invisible ball at `pos`, ready to fade in
    pub fn materialize(id: u32, pos: Vec2, size: Vec2) -> Self {
        Self {
            id,
            sprite: Sprite::new(pos).with_alpha(0.0).with_scale(0.5),
            vel: Vec2::ZERO,
            size,
            radius: size.x.min(size.y) / 2.0,
            bounce: Vec2::ONE,
            bounds: WorldBounds::open_bottom(),
            fade: None,
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.sprite.pos
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Advance the materialize animation; returns true on the tick it finishes
    pub fn tick_fade(&mut self, dt_ms: f32) -> bool {
        let Some(fade) = &mut self.fade else {
            return false;
        };
        self.sprite = fade.tick(dt_ms);
        if fade.is_finished() {
            self.fade = None;
            return true;
        }
        false
    }
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Paddle {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    /// Ease toward `target_x` by `blend` of the remaining distance,
    /// keeping the whole paddle inside `[0, field_width]`
    pub fn follow(&mut self, target_x: f32, blend: f32, field_width: f32) {
        let half = self.size.x / 2.0;
        let target = if field_width > self.size.x {
            target_x.clamp(half, field_width - half)
        } else {
            field_width / 2.0
        };
        self.pos.x = crate::lerp(self.pos.x, target, blend);
    }
}

/// Decorative particle converging on the ball spawn point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnParticle {
    pub id: u32,
    pub sprite: Sprite,
    pub tween: Tween,
}

/// One spark of a block burst
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spark {
    pub pos: Vec2,
    pub vel: Vec2,
    pub scale: f32,
}

/// Short-lived particle burst left behind by a destroyed block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Burst {
    pub id: u32,
    pub origin: Vec2,
    pub sparks: Vec<Spark>,
    pub age_ms: f32,
}

impl Burst {
    /// Move sparks outward and shrink them to nothing over their lifespan
    pub fn tick(&mut self, dt_ms: f32) {
        self.age_ms += dt_ms;
        let t = (self.age_ms / BURST_LIFESPAN_MS).min(1.0);
        let dt = dt_ms / 1000.0;
        for spark in &mut self.sparks {
            spark.pos += spark.vel * dt;
            spark.scale = crate::lerp(0.3, 0.0, t);
        }
        if t >= 1.0 {
            self.sparks.clear();
        }
    }
}

/// All live playfield entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    pub paddle: Paddle,
    /// Zero or one ball
    pub ball: Option<Ball>,
    /// The shared block collection
    pub blocks: Vec<Block>,
    pub spawn_particles: Vec<SpawnParticle>,
    pub bursts: Vec<Burst>,
    next_id: u32,
}

impl Arena {
    pub fn new(width: f32, height: f32, paddle_size: Vec2, paddle_offset_y: f32) -> Self {
        let home = Vec2::new(width / 2.0, height - paddle_offset_y);
        Self {
            width,
            height,
            paddle: Paddle::new(home, paddle_size),
            ball: None,
            blocks: Vec::new(),
            spawn_particles: Vec::new(),
            bursts: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Put the paddle back at centre-bottom
    pub fn reset_paddle(&mut self, paddle_offset_y: f32) {
        self.paddle.pos = Vec2::new(self.width / 2.0, self.height - paddle_offset_y);
    }

    /// Advance every block fade-in; returns how many finished this tick
    pub fn tick_block_fades(&mut self, dt_ms: f32) -> u32 {
        let mut finished = 0;
        for block in &mut self.blocks {
            if block.tick_fade(dt_ms) {
                finished += 1;
            }
        }
        finished
    }

    /// Move spawn particles along their tweens, dropping those that arrived;
    /// returns how many arrived this tick
    pub fn tick_spawn_particles(&mut self, dt_ms: f32) -> u32 {
        let mut arrived = 0;
        self.spawn_particles.retain_mut(|particle| {
            particle.sprite = particle.tween.tick(dt_ms);
            if particle.tween.is_finished() {
                arrived += 1;
                false
            } else {
                true
            }
        });
        arrived
    }

    pub fn clear_blocks(&mut self) {
        self.blocks.clear();
    }

    /// Destroy the ball; returns whether one existed
    pub fn remove_ball(&mut self) -> bool {
        self.ball.take().is_some()
    }

    /// Release every transient entity (the paddle persists)
    pub fn clear(&mut self) {
        self.ball = None;
        self.blocks.clear();
        self.spawn_particles.clear();
        self.bursts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_kind_wraps_every_nine_rows() {
        assert_eq!(BlockKind::for_row(0), BlockKind::Crimson);
        assert_eq!(BlockKind::for_row(8), BlockKind::Violet);
        assert_eq!(BlockKind::for_row(9), BlockKind::Crimson);
        assert_eq!(BlockKind::for_row(13).texture(), "block_05");
    }

    #[test]
    fn test_materialized_ball_collider() {
        let ball = Ball::materialize(1, Vec2::new(400.0, 500.0), Vec2::new(20.0, 16.0));
        assert_eq!(ball.radius, 8.0);
        assert_eq!(ball.bounce, Vec2::ONE);
        assert_eq!(ball.vel, Vec2::ZERO);
        assert!(!ball.bounds.bottom);
        assert!(ball.bounds.left && ball.bounds.right && ball.bounds.top);
    }

    #[test]
    fn test_paddle_follow_lags_and_clamps() {
        let mut paddle = Paddle::new(Vec2::new(400.0, 550.0), Vec2::new(96.0, 16.0));
        paddle.follow(500.0, 0.15, 800.0);
        assert!((paddle.pos.x - 415.0).abs() < 1e-3);

        // Pointer far outside the field: paddle converges on the clamped edge
        for _ in 0..200 {
            paddle.follow(-1000.0, 0.15, 800.0);
        }
        assert!((paddle.pos.x - 48.0).abs() < 0.01);
    }

    #[test]
    fn test_burst_fades_out() {
        let mut burst = Burst {
            id: 1,
            origin: Vec2::ZERO,
            sparks: vec![Spark {
                pos: Vec2::ZERO,
                vel: Vec2::new(100.0, 0.0),
                scale: 0.3,
            }],
            age_ms: 0.0,
        };
        burst.tick(150.0);
        assert!((burst.sparks[0].pos.x - 15.0).abs() < 1e-3);
        assert!((burst.sparks[0].scale - 0.15).abs() < 1e-3);
        burst.tick(200.0);
        assert!(burst.sparks.is_empty());
    }

    #[test]
    fn test_arena_clear_keeps_paddle() {
        let mut arena = Arena::new(800.0, 600.0, Vec2::new(96.0, 16.0), 50.0);
        let id = arena.next_entity_id();
        arena.ball = Some(Ball::materialize(id, Vec2::ZERO, Vec2::splat(16.0)));
        arena.paddle.pos.x = 100.0;
        arena.clear();
        assert!(arena.ball.is_none());
        assert_eq!(arena.paddle.pos.x, 100.0);

        arena.reset_paddle(50.0);
        assert_eq!(arena.paddle.pos, Vec2::new(400.0, 550.0));
    }
}
