//! Active play
//!
//! Paddle tracking, ball launch, collision response and the scoring / life
//! side effects that come with them.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{ball_bounds_collision, ball_in_gutter, ball_rect_collision, reflect_velocity};
use super::effects::{Effects, Sfx};
use super::machine::MatchEvent;
use super::session::Session;
use super::state::{Arena, Ball, Burst, Paddle, Spark};
use super::timer::{Scheduler, TimerAction};
use crate::consts::*;
use crate::direction_deg;

/// Play tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Per-tick blend of the paddle toward the pointer
    pub paddle_follow: f32,
    pub base_speed: f32,
    pub speed_per_level: f32,
    pub block_points: u64,
    /// Clamp on the normalized paddle hit offset
    pub hit_clamp: f32,
    pub max_deflect_deg: f32,
    pub gutter_margin: f32,
    pub gutter_delay_ms: f32,
    pub burst_cleanup_ms: f32,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            paddle_follow: PADDLE_FOLLOW,
            base_speed: BALL_BASE_SPEED,
            speed_per_level: BALL_SPEED_PER_LEVEL,
            block_points: BLOCK_POINTS,
            hit_clamp: PADDLE_HIT_CLAMP,
            max_deflect_deg: PADDLE_MAX_DEFLECT_DEG,
            gutter_margin: GUTTER_MARGIN,
            gutter_delay_ms: GUTTER_SIGNAL_DELAY_MS,
            burst_cleanup_ms: BURST_CLEANUP_MS,
        }
    }
}

impl GameplayConfig {
    /// Minimum ball speed on `level`
    pub fn level_speed(&self, level: u32) -> f32 {
        self.base_speed + level as f32 * self.speed_per_level
    }
}

/// Collision pairs resolved each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collider {
    BallPaddle,
    BallBlocks,
}

/// What a play frame produced that the match has to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Continue,
    /// The last block was destroyed
    BoardCleared,
    /// The ball dropped out of the playfield
    BallLost,
}

/// Everything a play frame may touch
pub struct PlayContext<'a> {
    pub arena: &'a mut Arena,
    pub session: &'a mut Session,
    pub effects: &'a mut Effects,
    pub scheduler: &'a mut Scheduler,
    pub rng: &'a mut Pcg32,
}

/// Draw a launch angle in degrees: uniform over the upward band, mirrored
/// about straight-up by a coin flip
pub fn launch_angle<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    let going_right = rng.random_bool(0.5);
    let angle = rng.random_range(LAUNCH_MIN_DEG..=LAUNCH_MAX_DEG);
    if going_right {
        angle
    } else {
        2.0 * PADDLE_BASE_DEG - angle
    }
}

/// Velocity after the ball strikes the paddle
///
/// The further from the paddle centre the hit, the steeper the deflection;
/// speed never drops below `floor`.
pub fn paddle_bounce(
    ball_pos: Vec2,
    ball_vel: Vec2,
    paddle: &Paddle,
    floor: f32,
    hit_clamp: f32,
    max_deflect_deg: f32,
) -> Vec2 {
    let half_width = paddle.size.x / 2.0;
    let offset = ((ball_pos.x - paddle.pos.x) / half_width).clamp(-hit_clamp, hit_clamp);
    let angle = PADDLE_BASE_DEG + offset * max_deflect_deg;
    let speed = ball_vel.length().max(floor);
    direction_deg(angle) * speed
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameplayController {
    config: GameplayConfig,
    pointer_x: Option<f32>,
    launched: bool,
    colliders: Vec<Collider>,
    /// Times collision handlers were wired (diagnostic)
    wirings: u32,
}

impl GameplayController {
    pub fn new(config: GameplayConfig) -> Self {
        Self {
            config,
            pointer_x: None,
            launched: false,
            colliders: Vec::new(),
            wirings: 0,
        }
    }

    pub fn config(&self) -> &GameplayConfig {
        &self.config
    }

    /// Latest pointer position (playfield x)
    pub fn set_pointer(&mut self, x: f32) {
        self.pointer_x = Some(x);
    }

    pub fn is_launched(&self) -> bool {
        self.launched
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    pub fn wirings(&self) -> u32 {
        self.wirings
    }

    /// Wire collisions and launch; run once on entering play
    pub fn begin_round(&mut self, ctx: &mut PlayContext) {
        self.wire_collisions(ctx.arena);
        self.launch_ball(ctx.arena, ctx.session.level(), ctx.rng);
    }

    /// Register the ball↔paddle and ball↔blocks pairs; false if already wired
    pub fn wire_collisions(&mut self, arena: &Arena) -> bool {
        debug_assert!(arena.ball.is_some(), "wiring collisions without a ball");
        debug_assert!(!arena.blocks.is_empty(), "wiring collisions without blocks");
        if !self.colliders.is_empty() {
            return false;
        }
        self.colliders = vec![Collider::BallPaddle, Collider::BallBlocks];
        self.wirings += 1;
        true
    }

    pub fn launch_ball(&mut self, arena: &mut Arena, level: u32, rng: &mut Pcg32) {
        if self.launched {
            return;
        }
        let Some(ball) = arena.ball.as_mut() else {
            return;
        };
        let angle = launch_angle(rng);
        ball.vel = direction_deg(angle) * self.config.level_speed(level);
        self.launched = true;
        log::debug!("Ball launched at {:.1}° ({:.0} px/s)", angle, ball.speed());
    }

    /// Forget launch and wiring state; scores are untouched
    pub fn reset(&mut self) {
        self.launched = false;
        self.colliders.clear();
    }

    pub fn reset_ball(&mut self) {
        self.reset();
    }

    /// Advance one frame of play
    pub fn update(&mut self, dt_ms: f32, ctx: &mut PlayContext) -> PlayOutcome {
        if let Some(x) = self.pointer_x {
            let width = ctx.arena.width;
            ctx.arena.paddle.follow(x, self.config.paddle_follow, width);
        }
        for burst in &mut ctx.arena.bursts {
            burst.tick(dt_ms);
        }

        let Some(mut ball) = ctx.arena.ball.take() else {
            return PlayOutcome::Continue;
        };
        ball.sprite.pos += ball.vel * (dt_ms / 1000.0);

        if self.bounce_off_walls(&mut ball, ctx.arena) {
            ctx.effects.sfx(Sfx::WallHit);
        }

        if self.colliders.contains(&Collider::BallPaddle) {
            self.collide_paddle(&mut ball, ctx);
        }

        let mut outcome = PlayOutcome::Continue;
        if self.colliders.contains(&Collider::BallBlocks) && self.collide_blocks(&mut ball, ctx) {
            outcome = PlayOutcome::BoardCleared;
        }

        if outcome == PlayOutcome::Continue
            && ball_in_gutter(ball.pos(), ctx.arena.height, self.config.gutter_margin)
        {
            self.lose_ball(ctx);
            return PlayOutcome::BallLost;
        }

        ctx.arena.ball = Some(ball);
        outcome
    }

    /// Reflect off blocking edges; returns whether any bounce happened
    fn bounce_off_walls(&self, ball: &mut Ball, arena: &Arena) -> bool {
        let hit = ball_bounds_collision(ball.pos(), ball.radius, arena.width, arena.height);
        if !hit.any() {
            return false;
        }
        let r = ball.radius;
        let pos = &mut ball.sprite.pos;
        let mut bounced = false;

        if hit.left && ball.bounds.left && ball.vel.x < 0.0 {
            ball.vel.x = -ball.vel.x * ball.bounce.x;
            pos.x = r;
            bounced = true;
        }
        if hit.right && ball.bounds.right && ball.vel.x > 0.0 {
            ball.vel.x = -ball.vel.x * ball.bounce.x;
            pos.x = arena.width - r;
            bounced = true;
        }
        if hit.top && ball.bounds.top && ball.vel.y < 0.0 {
            ball.vel.y = -ball.vel.y * ball.bounce.y;
            pos.y = r;
            bounced = true;
        }
        if hit.bottom && ball.bounds.bottom && ball.vel.y > 0.0 {
            ball.vel.y = -ball.vel.y * ball.bounce.y;
            pos.y = arena.height - r;
            bounced = true;
        }
        bounced
    }

    fn collide_paddle(&self, ball: &mut Ball, ctx: &mut PlayContext) {
        // Only on the way down, so a ball leaving the paddle cannot re-trigger
        if ball.vel.y <= 0.0 {
            return;
        }
        let paddle = &ctx.arena.paddle;
        let result = ball_rect_collision(ball.pos(), ball.radius, &paddle.rect());
        if !result.hit {
            return;
        }
        ball.sprite.pos += result.normal * result.penetration;
        ball.vel = paddle_bounce(
            ball.pos(),
            ball.vel,
            paddle,
            self.config.level_speed(ctx.session.level()),
            self.config.hit_clamp,
            self.config.max_deflect_deg,
        );
        ctx.effects.sfx(Sfx::PaddleHit);
    }

    /// Resolve the first block the ball overlaps; true if the board is now empty
    fn collide_blocks(&self, ball: &mut Ball, ctx: &mut PlayContext) -> bool {
        let Some((index, result)) = ctx
            .arena
            .blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (i, ball_rect_collision(ball.pos(), ball.radius, &b.rect)))
            .find(|(_, r)| r.hit)
        else {
            return false;
        };

        ball.sprite.pos += result.normal * result.penetration;
        if ball.vel.dot(result.normal) < 0.0 {
            ball.vel = reflect_velocity(ball.vel, result.normal) * ball.bounce;
        }

        let block = ctx.arena.blocks.remove(index);
        ctx.session.increase_score(self.config.block_points);
        ctx.effects.sfx(Sfx::BlockBreak);
        self.spawn_burst(block.rect.center, ctx);

        ctx.arena.blocks.is_empty()
    }

    fn spawn_burst(&self, origin: Vec2, ctx: &mut PlayContext) {
        let sparks = (0..BURST_PARTICLES)
            .map(|_| {
                let angle = ctx.rng.random_range(0.0..TAU);
                let speed = ctx.rng.random_range(BURST_MIN_SPEED..=BURST_MAX_SPEED);
                Spark {
                    pos: origin,
                    vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                    scale: 0.3,
                }
            })
            .collect();
        let id = ctx.arena.next_entity_id();
        ctx.arena.bursts.push(Burst {
            id,
            origin,
            sparks,
            age_ms: 0.0,
        });
        ctx.scheduler
            .schedule(self.config.burst_cleanup_ms, TimerAction::DestroyBurst(id));
    }

    fn lose_ball(&mut self, ctx: &mut PlayContext) {
        self.reset_ball();
        let lives = ctx.session.lose_life();
        ctx.effects.sfx(Sfx::BallLost);
        log::info!("Ball lost, {} lives left", lives);

        let signal = TimerAction::Raise(MatchEvent::BallGutter);
        if !ctx.scheduler.is_pending(signal) {
            ctx.scheduler.schedule(self.config.gutter_delay_ms, signal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle_deg;
    use crate::sim::collision::Rect;
    use crate::sim::effects::Effect;
    use crate::sim::state::{Block, BlockKind};
    use crate::sim::tween::Sprite;
    use proptest::prelude::*;
    use rand::SeedableRng;

    struct Fixture {
        arena: Arena,
        session: Session,
        effects: Effects,
        scheduler: Scheduler,
        rng: Pcg32,
    }

    impl Fixture {
        fn new() -> Self {
            let mut arena = Arena::new(800.0, 600.0, Vec2::new(96.0, 16.0), 50.0);
            let id = arena.next_entity_id();
            let mut ball = Ball::materialize(id, Vec2::new(400.0, 500.0), Vec2::splat(16.0));
            ball.sprite = Sprite::new(ball.pos());
            arena.ball = Some(ball);
            let mut fixture = Self {
                arena,
                session: Session::default(),
                effects: Effects::default(),
                scheduler: Scheduler::new(),
                rng: Pcg32::seed_from_u64(7),
            };
            fixture.add_block(Vec2::new(100.0, 100.0));
            fixture
        }

        fn add_block(&mut self, center: Vec2) -> u32 {
            let id = self.arena.next_entity_id();
            self.arena.blocks.push(Block {
                id,
                row: 0,
                col: 0,
                kind: BlockKind::Crimson,
                rect: Rect::new(center, Vec2::new(48.0, 16.0)),
                sprite: Sprite::new(center),
                fade: None,
                immovable: true,
            });
            id
        }

        fn ctx(&mut self) -> PlayContext<'_> {
            PlayContext {
                arena: &mut self.arena,
                session: &mut self.session,
                effects: &mut self.effects,
                scheduler: &mut self.scheduler,
                rng: &mut self.rng,
            }
        }

        fn ball(&mut self) -> &mut Ball {
            self.arena.ball.as_mut().expect("ball")
        }
    }

    #[test]
    fn test_begin_round_wires_once_and_launches() {
        let mut fx = Fixture::new();
        let mut controller = GameplayController::new(GameplayConfig::default());
        controller.begin_round(&mut fx.ctx());
        assert_eq!(controller.wirings(), 1);
        assert_eq!(controller.colliders(), &[Collider::BallPaddle, Collider::BallBlocks]);
        assert!(controller.is_launched());
        assert!(fx.ball().vel.y < 0.0);
        assert!((fx.ball().speed() - 325.0).abs() < 0.01);

        // Wiring again is refused
        assert!(!controller.wire_collisions(&fx.arena));
        for _ in 0..10 {
            controller.update(16.0, &mut fx.ctx());
        }
        assert_eq!(controller.wirings(), 1);
    }

    #[test]
    fn test_paddle_tracks_pointer_with_lag() {
        let mut fx = Fixture::new();
        let mut controller = GameplayController::new(GameplayConfig::default());
        controller.set_pointer(600.0);
        controller.update(16.0, &mut fx.ctx());
        assert!((fx.arena.paddle.pos.x - 430.0).abs() < 1e-3);
        controller.update(16.0, &mut fx.ctx());
        assert!((fx.arena.paddle.pos.x - 455.5).abs() < 1e-3);
    }

    #[test]
    fn test_block_hit_scores_and_bursts() {
        let mut fx = Fixture::new();
        fx.add_block(Vec2::new(300.0, 100.0));
        let mut controller = GameplayController::new(GameplayConfig::default());
        controller.wire_collisions(&fx.arena);

        // Heading straight up into the first block's underside
        let ball = fx.ball();
        ball.sprite.pos = Vec2::new(100.0, 120.0);
        ball.vel = Vec2::new(0.0, -300.0);
        let outcome = controller.update(16.0, &mut fx.ctx());

        assert_eq!(outcome, PlayOutcome::Continue);
        assert_eq!(fx.arena.blocks.len(), 1);
        assert_eq!(fx.session.score(), 10);
        assert!(fx.ball().vel.y > 0.0, "ball reflected downward");
        assert_eq!(fx.arena.bursts.len(), 1);
        assert_eq!(fx.arena.bursts[0].sparks.len(), BURST_PARTICLES as usize);
        assert!(fx.effects.pending().contains(&Effect::Sfx(Sfx::BlockBreak)));

        // Burst is cleaned up by its timer
        let actions = fx.scheduler.advance(BURST_CLEANUP_MS);
        assert!(matches!(actions.as_slice(), [TimerAction::DestroyBurst(_)]));
    }

    #[test]
    fn test_last_block_clears_board() {
        let mut fx = Fixture::new();
        let mut controller = GameplayController::new(GameplayConfig::default());
        controller.wire_collisions(&fx.arena);
        let ball = fx.ball();
        ball.sprite.pos = Vec2::new(100.0, 115.0);
        ball.vel = Vec2::new(0.0, -300.0);

        assert_eq!(controller.update(16.0, &mut fx.ctx()), PlayOutcome::BoardCleared);
        assert!(fx.arena.blocks.is_empty());
        assert!(fx.arena.ball.is_some());
    }

    #[test]
    fn test_unwired_ball_passes_through_blocks() {
        let mut fx = Fixture::new();
        let mut controller = GameplayController::new(GameplayConfig::default());
        let ball = fx.ball();
        ball.sprite.pos = Vec2::new(100.0, 100.0);
        controller.update(16.0, &mut fx.ctx());
        assert_eq!(fx.arena.blocks.len(), 1);
        assert_eq!(fx.session.score(), 0);
    }

    #[test]
    fn test_wall_bounce() {
        let mut fx = Fixture::new();
        let mut controller = GameplayController::new(GameplayConfig::default());
        let ball = fx.ball();
        ball.sprite.pos = Vec2::new(10.0, 300.0);
        ball.vel = Vec2::new(-300.0, -300.0);
        controller.update(16.0, &mut fx.ctx());

        let ball = fx.ball();
        assert_eq!(ball.vel, Vec2::new(300.0, -300.0));
        assert_eq!(ball.pos().x, 8.0);
        assert_eq!(fx.effects.pending(), &[Effect::Sfx(Sfx::WallHit)]);
    }

    #[test]
    fn test_paddle_hit_redirects_upward() {
        let mut fx = Fixture::new();
        let mut controller = GameplayController::new(GameplayConfig::default());
        controller.wire_collisions(&fx.arena);
        // Paddle at (400, 550); hit halfway to its right edge
        let ball = fx.ball();
        ball.sprite.pos = Vec2::new(424.0, 536.0);
        ball.vel = Vec2::new(0.0, 100.0);
        controller.update(0.0, &mut fx.ctx());

        let ball = fx.ball();
        assert!((angle_deg(ball.vel) - (-60.0)).abs() < 0.01);
        assert!((ball.speed() - 325.0).abs() < 0.01, "slow ball raised to the level floor");
        assert!(fx.effects.pending().contains(&Effect::Sfx(Sfx::PaddleHit)));
    }

    #[test]
    fn test_gutter_costs_one_life_and_signals_once() {
        let mut fx = Fixture::new();
        let mut controller = GameplayController::new(GameplayConfig::default());
        controller.begin_round(&mut fx.ctx());
        let ball = fx.ball();
        ball.sprite.pos = Vec2::new(400.0, 660.0);
        ball.vel = Vec2::new(0.0, 300.0);

        assert_eq!(controller.update(16.0, &mut fx.ctx()), PlayOutcome::BallLost);
        assert!(fx.arena.ball.is_none());
        assert_eq!(fx.session.lives(), 3);
        assert!(!controller.is_launched());
        assert!(controller.colliders().is_empty());

        // No ball, nothing more to lose
        assert_eq!(controller.update(16.0, &mut fx.ctx()), PlayOutcome::Continue);
        assert_eq!(fx.session.lives(), 3);

        let fired = fx.scheduler.advance(GUTTER_SIGNAL_DELAY_MS);
        assert_eq!(fired, vec![TimerAction::Raise(MatchEvent::BallGutter)]);
    }

    proptest! {
        #[test]
        fn prop_launch_is_upward(seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let angle = launch_angle(&mut rng);
            prop_assert!((LAUNCH_MIN_DEG..=LAUNCH_MAX_DEG).contains(&angle));
            prop_assert!(direction_deg(angle).y < 0.0);
        }

        #[test]
        fn prop_paddle_bounce_angle_and_speed(
            offset in -200.0f32..200.0,
            vx in -600.0f32..600.0,
            vy in 1.0f32..600.0,
            level in 1u32..30,
        ) {
            let config = GameplayConfig::default();
            let paddle = Paddle::new(Vec2::new(400.0, 550.0), Vec2::new(96.0, 16.0));
            let vel = Vec2::new(vx, vy);
            let floor = config.level_speed(level);
            let out = paddle_bounce(
                Vec2::new(400.0 + offset, 540.0),
                vel,
                &paddle,
                floor,
                config.hit_clamp,
                config.max_deflect_deg,
            );
            let angle = angle_deg(out);
            prop_assert!(angle >= -150.0 - 1e-3 && angle <= -30.0 + 1e-3);
            // Never more than the clamped ±48° from vertical
            prop_assert!((angle + 90.0).abs() <= 48.0 + 1e-3);
            prop_assert!(out.length() >= floor - 1e-2);
            prop_assert!(out.length() >= vel.length() - 1e-2);
        }
    }
}
