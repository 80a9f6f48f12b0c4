//! Flipphone Racer native entry point
//!
//! Runs the game headless: no window, no audio device. A small autopilot
//! steers around obstacles on a synthetic 60 Hz clock and the outcome is
//! logged. Configuration comes from the environment:
//!
//! - `RACER_SEED`: gameplay seed (random when unset)
//! - `RACER_TICKS`: tick budget before giving up (default 36000, ten minutes)
//! - `RACER_DATA_DIR`: directory for settings and high scores (memory only when unset)

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::env;
    use std::str::FromStr;
    use std::time::Duration;

    use flipphone_racer::audio::LoggingAudio;
    use flipphone_racer::consts::*;
    use flipphone_racer::platform::{FIXED_DT, FileStore, KeyValueStore, MemoryStore, RawInput};
    use flipphone_racer::renderer::{GameView, RenderSink};
    use flipphone_racer::sim::RunState;
    use flipphone_racer::{Game, Mode, ModeKind, Services};

    const SEED_ENV_VAR: &str = "RACER_SEED";
    const TICKS_ENV_VAR: &str = "RACER_TICKS";
    const DATA_DIR_ENV_VAR: &str = "RACER_DATA_DIR";
    const DEFAULT_TICK_BUDGET: u64 = 36_000;

    /// How far ahead of the player the autopilot looks, in pixels
    const LOOKAHEAD: f32 = 260.0;
    /// Log the HUD every this many frames
    const HUD_LOG_FRAMES: u64 = 600;

    /// Logs the HUD now and then instead of drawing
    #[derive(Default)]
    struct HudLogger {
        frames: u64,
    }

    impl RenderSink for HudLogger {
        fn render(&mut self, view: &GameView<'_>) {
            self.frames += 1;
            if self.frames % HUD_LOG_FRAMES != 0 {
                return;
            }
            if let Some(hud) = view.hud() {
                log::info!(
                    "score {} | {} | {} | health {}",
                    hud.score,
                    hud.distance,
                    hud.multiplier,
                    hud.health
                );
            }
        }
    }

    /// Read a numeric env var, warning and falling back on bad values
    fn env_number<T: FromStr>(name: &str) -> Option<T> {
        let value = env::var(name).ok()?;
        match value.trim().parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                log::warn!("Ignoring {name}={value:?}: not a number");
                None
            }
        }
    }

    fn store_from_env() -> Box<dyn KeyValueStore> {
        match env::var_os(DATA_DIR_ENV_VAR) {
            Some(dir) => {
                log::info!("Saving to {}", dir.to_string_lossy());
                Box::new(FileStore::new(dir))
            }
            None => Box::new(MemoryStore::new()),
        }
    }

    fn lane_blocked(run: &RunState, lane: usize) -> bool {
        let player_y = run.player.pos.y;
        run.obstacles.iter_live().any(|o| {
            o.lane == lane && o.pos.y < player_y + run.player.size.y && o.pos.y > player_y - LOOKAHEAD
        })
    }

    /// Key to hold this frame: steer out of a blocked lane, otherwise nothing
    fn autopilot(run: &RunState) -> RawInput {
        let player = &run.player;
        if player.is_changing_lane() || !lane_blocked(run, player.target_lane) {
            return RawInput::default();
        }
        let lane = player.target_lane;
        let left = lane.checked_sub(1).filter(|&l| !lane_blocked(run, l));
        let right = Some(lane + 1).filter(|&l| l < LANES && !lane_blocked(run, l));
        match (left, right) {
            // Prefer heading back toward the middle
            (Some(_), Some(_)) if lane > LANES / 2 => RawInput::keys(&["ArrowLeft"]),
            (_, Some(_)) => RawInput::keys(&["ArrowRight"]),
            (Some(_), None) => RawInput::keys(&["ArrowLeft"]),
            (None, None) => RawInput::keys(&["ArrowDown"]),
        }
    }

    pub fn run() {
        env_logger::init();

        let seed = env_number::<u64>(SEED_ENV_VAR);
        let budget = env_number::<u64>(TICKS_ENV_VAR).unwrap_or(DEFAULT_TICK_BUDGET);
        let services = Services::new(Box::new(LoggingAudio::new()), store_from_env());
        let mut game = Game::new(services, seed);
        let mut renderer = HudLogger::default();

        log::info!(
            "Flipphone Racer (native) starting: seed {}, up to {} ticks",
            game.seed(),
            budget
        );

        let mut now = Duration::ZERO;
        game.frame(now, &RawInput::default(), &mut renderer);
        game.start_run();

        while game.ticks() < budget && game.mode_kind() == ModeKind::Playing {
            let input = game.run().map(autopilot).unwrap_or_default();
            now += FIXED_DT;
            game.frame(now, &input, &mut renderer);
        }

        match game.mode() {
            Mode::GameOver { summary, .. } => log::info!(
                "Finished after {} ticks: score {:.0}, distance {:.0}m{}",
                game.ticks(),
                summary.score,
                summary.distance,
                if summary.new_record { " (new record)" } else { "" }
            ),
            _ => {
                if let Some(run) = game.run() {
                    log::info!(
                        "Tick budget spent: score {:.0}, distance {:.0}m, health {}/{}",
                        run.score,
                        run.distance,
                        run.player.health,
                        run.player.max_health
                    );
                }
            }
        }

        let best = game.high_scores().get(game.settings().difficulty);
        log::info!(
            "Best on {}: score {:.0}, distance {:.0}m",
            game.settings().difficulty.as_str(),
            best.score,
            best.distance
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web host drives `flipphone_racer::Game` directly
}
