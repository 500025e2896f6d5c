//! Breakout entry point
//!
//! On the web this only installs logging; JS drives `WebGame`. Natively it
//! plays a headless match with an autopilot paddle and logs how it went.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Breakout starting...");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use breakout::Settings;
    use breakout::audio::{AudioManager, LogBackend};
    use breakout::platform::{EndSummary, Router, route_effects};
    use breakout::sim::{Game, MatchState, TickInput, tick};

    /// 60 fps frame delta
    const FRAME_MS: f32 = 1000.0 / 60.0;
    /// Give up after ten simulated minutes
    const MAX_FRAMES: u32 = 60 * 60 * 10;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Breakout (native) starting headless autopilot match...");

    let settings = Settings::load();
    let mut game = Game::new(&settings);
    let mut audio = AudioManager::new(LogBackend, settings.audio.clone(), game.seed());
    let mut router = Router::default();

    game.start();
    let mut frames = 0;
    while frames < MAX_FRAMES && game.state() != MatchState::GameOver {
        // Chase the ball, with a little slop so the match eventually ends
        let pointer_x = game
            .arena()
            .ball
            .as_ref()
            .map(|ball| ball.pos().x + (frames % 97) as f32 - 48.0);
        let input = TickInput {
            pointer_x,
            ..Default::default()
        };
        tick(&mut game, &input, FRAME_MS);
        route_effects(game.drain_effects(), &mut audio, &mut router);
        frames += 1;
    }

    // Let the end-screen timer fire
    for _ in 0..120 {
        tick(&mut game, &TickInput::default(), FRAME_MS);
        route_effects(game.drain_effects(), &mut audio, &mut router);
    }

    let summary = EndSummary::from_session(game.session());
    log::info!(
        "{} after {:.1}s: score {}, best {}, level {}, screen {:?}",
        summary.title(),
        frames as f32 * FRAME_MS / 1000.0,
        summary.score,
        summary.high_score,
        summary.level,
        router.current()
    );
    game.shutdown();
}
