//! Ball spawning
//!
//! A ring of particles converges on the spawn point one after another; once
//! they have all arrived the ball materializes there and scales in.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::effects::{Effects, Sfx};
use super::machine::MatchEvent;
use super::sequencer::{Sequencer, SettleRule};
use super::state::{Arena, Ball, SpawnParticle};
use super::tween::{Easing, Sprite, Tween};
use crate::consts::*;

/// Spawn animation layout and timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Where the ball appears; `None` means centred, `SPAWN_OFFSET_Y` above the bottom
    pub spawn_point: Option<Vec2>,
    pub particle_count: u32,
    pub particle_radius: f32,
    pub particle_ms: f32,
    pub stagger_ms: f32,
    pub start_delay_ms: f32,
    pub ball_fade_ms: f32,
    pub ball_size: Vec2,
    pub settle: SettleRule,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            spawn_point: None,
            particle_count: SPAWN_PARTICLES,
            particle_radius: SPAWN_RADIUS,
            particle_ms: SPAWN_PARTICLE_MS,
            stagger_ms: SPAWN_STAGGER_MS,
            start_delay_ms: SEQUENCE_START_DELAY_MS,
            ball_fade_ms: BALL_FADE_MS,
            ball_size: Vec2::new(BALL_WIDTH, BALL_HEIGHT),
            settle: SettleRule::Counted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnPhase {
    Idle,
    /// Particles converging
    Converging,
    /// Ball scaling in
    Materializing,
    Complete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallSpawner {
    config: SpawnerConfig,
    sequencer: Sequencer,
    phase: SpawnPhase,
    on_complete: Option<MatchEvent>,
}

impl BallSpawner {
    pub fn new(config: SpawnerConfig) -> Self {
        let sequencer = Sequencer::new(config.stagger_ms, config.start_delay_ms, config.settle);
        Self {
            config,
            sequencer,
            phase: SpawnPhase::Idle,
            on_complete: None,
        }
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    pub fn phase(&self) -> SpawnPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SpawnPhase::Complete
    }

    pub fn spawn_point(&self, arena: &Arena) -> Vec2 {
        self.config
            .spawn_point
            .unwrap_or(Vec2::new(arena.width / 2.0, arena.height - SPAWN_OFFSET_Y))
    }

    /// Start a spawn cycle; `on_complete` is returned once the ball is fully in
    pub fn start_spawning(
        &mut self,
        arena: &mut Arena,
        effects: &mut Effects,
        on_complete: MatchEvent,
    ) {
        arena.spawn_particles.clear();
        self.sequencer.start(self.config.particle_count);
        self.phase = SpawnPhase::Converging;
        self.on_complete = Some(on_complete);
        effects.sfx(Sfx::Swoop);
    }

    /// Advance one frame; returns the completion event exactly once
    pub fn update(
        &mut self,
        dt_ms: f32,
        arena: &mut Arena,
        effects: &mut Effects,
    ) -> Option<MatchEvent> {
        debug_assert!(
            self.phase != SpawnPhase::Idle,
            "ball spawner ticked before start_spawning"
        );

        self.tick_particles(dt_ms, arena);

        match self.phase {
            SpawnPhase::Idle | SpawnPhase::Complete => None,
            SpawnPhase::Converging => {
                if let Some(index) = self.sequencer.advance(dt_ms) {
                    self.emit_particle(index, arena);
                }
                if self.sequencer.is_settled() {
                    self.materialize(arena, effects);
                }
                None
            }
            SpawnPhase::Materializing => {
                let finished = match arena.ball.as_mut() {
                    Some(ball) => ball.tick_fade(dt_ms) || ball.fade.is_none(),
                    None => {
                        log::warn!("Ball vanished while materializing");
                        true
                    }
                };
                if finished {
                    self.phase = SpawnPhase::Complete;
                    return self.on_complete.take();
                }
                None
            }
        }
    }

    /// Drop live particles and the ball; session counters are untouched
    pub fn reset(&mut self, arena: &mut Arena) {
        arena.spawn_particles.clear();
        arena.remove_ball();
        self.sequencer.reset();
        self.phase = SpawnPhase::Idle;
        self.on_complete = None;
    }

    /// Move particles toward the spawn point, removing those that arrived
    fn tick_particles(&mut self, dt_ms: f32, arena: &mut Arena) {
        for _ in 0..arena.tick_spawn_particles(dt_ms) {
            self.sequencer.item_finished();
        }
    }

    fn emit_particle(&mut self, index: u32, arena: &mut Arena) {
        let spawn = self.spawn_point(arena);
        let angle = index as f32 / self.config.particle_count as f32 * TAU;
        let start = spawn + Vec2::new(angle.cos(), angle.sin()) * self.config.particle_radius;

        let from = Sprite::new(start).with_scale(0.8).with_alpha(0.8);
        let to = Sprite::new(spawn).with_scale(0.1).with_alpha(0.0);
        let id = arena.next_entity_id();
        arena.spawn_particles.push(SpawnParticle {
            id,
            sprite: from,
            tween: Tween::new(from, to, self.config.particle_ms, Easing::Power2),
        });
    }

    fn materialize(&mut self, arena: &mut Arena, effects: &mut Effects) {
        debug_assert!(arena.ball.is_none(), "materializing over a live ball");
        let spawn = self.spawn_point(arena);
        let id = arena.next_entity_id();
        let mut ball = Ball::materialize(id, spawn, self.config.ball_size);
        ball.fade = Some(Tween::new(
            ball.sprite,
            Sprite::new(spawn),
            self.config.ball_fade_ms,
            Easing::BackOut,
        ));
        arena.ball = Some(ball);
        self.phase = SpawnPhase::Materializing;
        effects.sfx(Sfx::Materialize);
        log::debug!("Ball {} materialized at {:?}", id, spawn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::effects::Effect;

    fn arena() -> Arena {
        Arena::new(800.0, 600.0, Vec2::new(96.0, 16.0), 50.0)
    }

    fn quick_config() -> SpawnerConfig {
        SpawnerConfig {
            particle_count: 4,
            particle_radius: 100.0,
            particle_ms: 100.0,
            stagger_ms: 10.0,
            start_delay_ms: 10.0,
            ball_fade_ms: 50.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_particles_start_on_ring() {
        let mut spawner = BallSpawner::new(quick_config());
        let mut arena = arena();
        let mut effects = Effects::default();
        spawner.start_spawning(&mut arena, &mut effects, MatchEvent::GamePlay);

        let spawn = spawner.spawn_point(&arena);
        assert_eq!(spawn, Vec2::new(400.0, 500.0));

        // First particle at angle 0, second at a quarter turn
        spawner.update(10.0, &mut arena, &mut effects);
        let first = arena.spawn_particles[0].sprite.pos;
        assert!((first - Vec2::new(500.0, 500.0)).length() < 1e-3);

        spawner.update(10.0, &mut arena, &mut effects);
        let second = arena.spawn_particles[1].tween.value();
        // The first tick of its tween has not run yet
        assert!((second.pos - Vec2::new(400.0, 600.0)).length() < 1e-3);
        assert_eq!(second.scale, 0.8);
    }

    #[test]
    fn test_ball_appears_after_particles_then_completes() {
        let mut spawner = BallSpawner::new(quick_config());
        let mut arena = arena();
        let mut effects = Effects::default();
        spawner.start_spawning(&mut arena, &mut effects, MatchEvent::GamePlay);

        let mut completed_at = None;
        for tick in 1..200 {
            if let Some(event) = spawner.update(10.0, &mut arena, &mut effects) {
                assert_eq!(event, MatchEvent::GamePlay);
                completed_at = Some(tick);
                break;
            }
            if arena.ball.is_some() {
                assert!(arena.spawn_particles.is_empty());
            }
        }
        // Last particle emitted at 40 ms, arrives at 140 ms, ball fades by 190 ms
        assert_eq!(completed_at, Some(19));

        let ball = arena.ball.as_ref().expect("ball materialized");
        assert_eq!(ball.vel, Vec2::ZERO);
        assert_eq!(ball.radius, 8.0);
        assert_eq!(ball.sprite.alpha, 1.0);
        assert_eq!(ball.sprite.scale, 1.0);
        assert!(spawner.is_complete());

        let sfx: Vec<_> = effects.drain();
        assert_eq!(sfx.first(), Some(&Effect::Sfx(Sfx::Swoop)));
        assert_eq!(
            sfx.iter().filter(|e| **e == Effect::Sfx(Sfx::Materialize)).count(),
            1
        );

        // Nothing more once complete
        assert_eq!(spawner.update(10.0, &mut arena, &mut effects), None);
    }

    #[test]
    fn test_elapsed_settle_rule() {
        let config = SpawnerConfig {
            settle: SettleRule::Elapsed {
                item_duration_ms: 100.0,
                fraction: SETTLE_FRACTION,
            },
            ..quick_config()
        };
        let mut spawner = BallSpawner::new(config);
        let mut arena = arena();
        let mut effects = Effects::default();
        spawner.start_spawning(&mut arena, &mut effects, MatchEvent::GamePlay);

        let mut ticks = 0;
        while arena.ball.is_none() {
            spawner.update(10.0, &mut arena, &mut effects);
            ticks += 1;
        }
        // Last particle at 40 ms, next due 50 ms, settled at 50 + 70 = 120 ms
        assert_eq!(ticks, 12);
        // Its convergence is not quite over
        assert!(!arena.spawn_particles.is_empty());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut spawner = BallSpawner::new(quick_config());
        let mut arena = arena();
        let mut effects = Effects::default();
        spawner.start_spawning(&mut arena, &mut effects, MatchEvent::GamePlay);
        for _ in 0..16 {
            spawner.update(10.0, &mut arena, &mut effects);
        }
        assert!(arena.ball.is_some());

        spawner.reset(&mut arena);
        assert!(arena.ball.is_none());
        assert!(arena.spawn_particles.is_empty());
        assert_eq!(spawner.phase(), SpawnPhase::Idle);

        spawner.reset(&mut arena);
        assert!(arena.ball.is_none());
        assert!(arena.spawn_particles.is_empty());
        assert_eq!(spawner.phase(), SpawnPhase::Idle);
    }
}
