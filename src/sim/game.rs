//! Match orchestrator
//!
//! Owns every component and the session, feeds events through the transition
//! table and runs entry actions. Component completions come back from their
//! `update` calls as ordinary events.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::board::BoardBuilder;
use super::effects::{Effect, Effects, MusicTrack, Screen};
use super::gameplay::{GameplayController, PlayContext, PlayOutcome};
use super::machine::{MatchEvent, MatchState, next_state};
use super::session::Session;
use super::spawner::BallSpawner;
use super::state::Arena;
use super::timer::{Scheduler, TimerAction};
use crate::consts::*;
use crate::settings::Settings;

pub struct Game {
    state: MatchState,
    session: Session,
    arena: Arena,
    builder: BoardBuilder,
    spawner: BallSpawner,
    controller: GameplayController,
    scheduler: Scheduler,
    effects: Effects,
    rng: Pcg32,
    seed: u64,
    paddle_offset_y: f32,
    /// Set by `shutdown`; a stopped game ignores events and ticks
    stopped: bool,
}

impl Game {
    /// Create a match in `Start`; nothing happens until [`start`](Self::start)
    ///
    /// Settings that fail [`Settings::validate`] are replaced by the defaults
    /// (keeping the seed).
    pub fn new(settings: &Settings) -> Self {
        let fallback;
        let settings = match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                log::warn!("Invalid settings, using defaults: {}", e);
                fallback = Settings {
                    seed: settings.seed,
                    ..Default::default()
                };
                &fallback
            }
        };
        let seed = settings.seed.unwrap_or_else(rand::random);
        Self {
            state: MatchState::Start,
            session: Session::new(settings.starting_lives),
            arena: Arena::new(
                settings.width,
                settings.height,
                settings.paddle_size,
                settings.paddle_offset_y,
            ),
            builder: BoardBuilder::new(settings.board.clone()),
            spawner: BallSpawner::new(settings.spawner.clone()),
            controller: GameplayController::new(settings.gameplay.clone()),
            scheduler: Scheduler::new(),
            effects: Effects::default(),
            rng: Pcg32::seed_from_u64(seed),
            seed,
            paddle_offset_y: settings.paddle_offset_y,
            stopped: false,
        }
    }

    /// Run the `Start` entry action, kicking off the first board build
    pub fn start(&mut self) {
        log::info!("Starting match (seed {})", self.seed);
        if let Some(event) = self.enter(MatchState::Start) {
            self.dispatch(event);
        }
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Times the collider pair was wired this match
    pub fn collision_wirings(&self) -> u32 {
        self.controller.wirings()
    }

    /// Pending side effects, oldest first
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        self.effects.drain()
    }

    pub fn set_pointer(&mut self, x: f32) {
        self.controller.set_pointer(x);
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.session.is_paused() != paused {
            log::info!("{}", if paused { "Paused" } else { "Resumed" });
        }
        self.session.set_paused(paused);
    }

    /// Feed an event to the state machine
    ///
    /// Only component completions and match timers raise events. Entry
    /// actions run on arrival, and events they raise are handled before this
    /// returns. Events the current state does not accept are dropped.
    pub(crate) fn dispatch(&mut self, event: MatchEvent) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            if self.stopped {
                log::debug!("Ignoring {}: match stopped", event.name());
                return;
            }
            let Some(target) = next_state(self.state, event) else {
                log::debug!("Ignoring {} in {:?}", event.name(), self.state);
                continue;
            };
            log::info!("{:?} --{}--> {:?}", self.state, event.name(), target);
            if let Some(raised) = self.enter(target) {
                queue.push_back(raised);
            }
        }
    }

    /// Switch to `state` and run its entry action; returns an event it raised
    fn enter(&mut self, state: MatchState) -> Option<MatchEvent> {
        self.state = state;
        match state {
            MatchState::Start => {
                self.session.new_game();
                self.effects.push(Effect::StartMusic(MusicTrack::Background));
                Some(MatchEvent::BoardBuild)
            }
            MatchState::BuildBoard => {
                self.builder
                    .start_building(self.session.level(), &mut self.arena, MatchEvent::BallSpawn);
                None
            }
            MatchState::SpawnBall => {
                self.arena.remove_ball();
                self.controller.reset();
                self.arena.reset_paddle(self.paddle_offset_y);
                self.spawner
                    .start_spawning(&mut self.arena, &mut self.effects, MatchEvent::GamePlay);
                None
            }
            MatchState::GamePlay => {
                let mut ctx = PlayContext {
                    arena: &mut self.arena,
                    session: &mut self.session,
                    effects: &mut self.effects,
                    scheduler: &mut self.scheduler,
                    rng: &mut self.rng,
                };
                self.controller.begin_round(&mut ctx);
                None
            }
            MatchState::CheckGameOver => {
                if self.session.lives() == 0 {
                    Some(MatchEvent::GameEnd)
                } else {
                    Some(MatchEvent::BallSpawn)
                }
            }
            MatchState::GameOver => {
                log::info!(
                    "Game over: score {} (best {}), level {}",
                    self.session.score(),
                    self.session.high_score(),
                    self.session.level()
                );
                self.scheduler
                    .schedule(GAME_OVER_DELAY_MS, TimerAction::ShowEndScreen);
                None
            }
        }
    }

    /// Advance the match clock and the active component by `dt_ms`
    pub(crate) fn advance(&mut self, dt_ms: f32) {
        if self.stopped || self.session.is_paused() {
            return;
        }

        for action in self.scheduler.advance(dt_ms) {
            self.run_timer(action);
        }
        if self.stopped {
            return;
        }

        // Fades keep running after the component that started them is done
        if self.state != MatchState::BuildBoard {
            self.arena.tick_block_fades(dt_ms);
        }
        if self.state != MatchState::SpawnBall {
            self.arena.tick_spawn_particles(dt_ms);
        }
        if !self.state.is_ticking() {
            return;
        }

        let completed = match self.state {
            MatchState::BuildBoard => self.builder.update(dt_ms, &mut self.arena, &mut self.effects),
            MatchState::SpawnBall => self.spawner.update(dt_ms, &mut self.arena, &mut self.effects),
            MatchState::GamePlay => self.play(dt_ms),
            MatchState::Start | MatchState::CheckGameOver | MatchState::GameOver => None,
        };
        if let Some(event) = completed {
            self.dispatch(event);
        }
    }

    fn play(&mut self, dt_ms: f32) -> Option<MatchEvent> {
        let mut ctx = PlayContext {
            arena: &mut self.arena,
            session: &mut self.session,
            effects: &mut self.effects,
            scheduler: &mut self.scheduler,
            rng: &mut self.rng,
        };
        match self.controller.update(dt_ms, &mut ctx) {
            PlayOutcome::Continue | PlayOutcome::BallLost => None,
            PlayOutcome::BoardCleared => {
                self.clear_board();
                Some(MatchEvent::BoardClear)
            }
        }
    }

    /// Level-up bonus, paid before the next board is built
    fn clear_board(&mut self) {
        self.arena.remove_ball();
        self.controller.reset();
        self.session.advance_level();
        let bonus = LEVEL_CLEAR_POINTS * u64::from(self.session.level());
        self.session.increase_score(bonus);
        log::info!(
            "Board cleared: level {} (+{} points)",
            self.session.level(),
            bonus
        );
    }

    fn run_timer(&mut self, action: TimerAction) {
        match action {
            TimerAction::Raise(event) => self.dispatch(event),
            TimerAction::ShowEndScreen => {
                self.effects.push(Effect::StopMusic);
                self.effects.push(Effect::Navigate(Screen::EndScreen));
            }
            TimerAction::DestroyBurst(id) => self.arena.bursts.retain(|b| b.id != id),
        }
    }

    /// Tear the match down: no further events, ticks or timers
    pub fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.builder.reset(&mut self.arena);
        self.spawner.reset(&mut self.arena);
        self.controller.reset();
        self.arena.clear();
        self.scheduler.cancel();
        log::info!("Match shut down in {:?}", self.state);
    }
}
