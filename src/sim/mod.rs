//! Deterministic match engine
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only moves through `tick`
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies (side effects go to an outbox)

pub mod board;
pub mod collision;
pub mod effects;
pub mod game;
pub mod gameplay;
pub mod machine;
pub mod sequencer;
pub mod session;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod timer;
pub mod tween;

pub use board::{BoardBuilder, BoardConfig, block_count, rows_for_level};
pub use collision::{CollisionResult, Rect, ball_rect_collision, reflect_velocity};
pub use effects::{Effect, Effects, MusicTrack, Screen, Sfx};
pub use game::Game;
pub use gameplay::{GameplayConfig, GameplayController, launch_angle, paddle_bounce};
pub use machine::{MatchEvent, MatchState, TRANSITIONS, next_state};
pub use sequencer::{Cursor, Sequencer, SettleRule};
pub use session::Session;
pub use spawner::{BallSpawner, SpawnPhase, SpawnerConfig};
pub use state::{Arena, Ball, Block, BlockKind, Burst, Paddle, SpawnParticle};
pub use tick::{TickInput, tick};
pub use timer::{CancelToken, Scheduler, TimerAction};
pub use tween::{Easing, Sprite, Tween};
