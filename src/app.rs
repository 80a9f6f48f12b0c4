//! Application mode machine and frame driver
//!
//! `Game` owns every service and the current `Mode`. Each frame it feeds the
//! raw input sample to the input layer, runs as many fixed ticks as the clock
//! allows, then hands a `GameView` to the renderer exactly once.

use std::collections::BTreeSet;
use std::time::Duration;

use glam::Vec2;

use crate::audio::{AudioSink, SilentAudio, SoundEffect};
use crate::consts::*;
use crate::highscores::HighScores;
use crate::persistence::Persistence;
use crate::platform::input::{Action, InputLayer, KeyMap, RawInput};
use crate::platform::storage::{KeyValueStore, MemoryStore};
use crate::platform::time::FixedStep;
use crate::renderer::{GameView, Palette, RenderSink};
use crate::settings::Settings;
use crate::sim::{self, GameEvent, GameRng, PickupKind, RunEndCause, RunState, TickInput};

/// Salt for the cosmetic stream derived from the game seed
const FX_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Collaborators injected at startup
pub struct Services {
    pub audio: Box<dyn AudioSink>,
    pub store: Box<dyn KeyValueStore>,
}

impl Services {
    pub fn new(audio: Box<dyn AudioSink>, store: Box<dyn KeyValueStore>) -> Self {
        Self { audio, store }
    }

    /// No sound, nothing persisted beyond the process
    pub fn headless() -> Self {
        Self::new(Box::new(SilentAudio), Box::new(MemoryStore::new()))
    }
}

/// Selection in a vertical menu with time-debounced navigation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuCursor {
    selected: usize,
    len: usize,
    wrap: bool,
    last_input_ms: Option<f64>,
}

impl MenuCursor {
    pub fn wrapping(len: usize) -> Self {
        Self {
            selected: 0,
            len: len.max(1),
            wrap: true,
            last_input_ms: None,
        }
    }

    /// Stops at the first and last item
    pub fn clamped(len: usize) -> Self {
        Self {
            wrap: false,
            ..Self::wrapping(len)
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    fn ready(&self, now_ms: f64) -> bool {
        self.last_input_ms
            .is_none_or(|last| now_ms - last >= MENU_DEBOUNCE_MS)
    }

    /// Accept a menu input unless one was accepted too recently
    fn accept(&mut self, now_ms: f64) -> bool {
        if !self.ready(now_ms) {
            return false;
        }
        self.last_input_ms = Some(now_ms);
        true
    }

    /// Move by `delta` items; false when debounced
    pub fn step(&mut self, delta: isize, now_ms: f64) -> bool {
        if !self.accept(now_ms) {
            return false;
        }
        let len = self.len as isize;
        let target = self.selected as isize + delta;
        self.selected = if self.wrap {
            target.rem_euclid(len) as usize
        } else {
            target.clamp(0, len - 1) as usize
        };
        true
    }
}

/// One row of the settings screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsRow {
    Sound,
    Music,
    ReducedMotion,
    Colorblind,
    Difficulty,
    TouchLayout,
    Keybind(Action),
}

impl SettingsRow {
    pub const ALL: [SettingsRow; 13] = [
        SettingsRow::Sound,
        SettingsRow::Music,
        SettingsRow::ReducedMotion,
        SettingsRow::Colorblind,
        SettingsRow::Difficulty,
        SettingsRow::TouchLayout,
        SettingsRow::Keybind(Action::Left),
        SettingsRow::Keybind(Action::Right),
        SettingsRow::Keybind(Action::Up),
        SettingsRow::Keybind(Action::Down),
        SettingsRow::Keybind(Action::Brake),
        SettingsRow::Keybind(Action::Pause),
        SettingsRow::Keybind(Action::Confirm),
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SettingsRow::Sound => "Sound",
            SettingsRow::Music => "Music",
            SettingsRow::ReducedMotion => "Reduced Motion",
            SettingsRow::Colorblind => "Colorblind Mode",
            SettingsRow::Difficulty => "Difficulty",
            SettingsRow::TouchLayout => "Touch Layout",
            SettingsRow::Keybind(action) => action.as_str(),
        }
    }
}

/// Waiting for a key to bind to `action`
#[derive(Debug, Clone, PartialEq)]
pub struct KeyCapture {
    pub action: Action,
    /// Codes held on the previous tick; only codes outside this set count
    seen: BTreeSet<String>,
}

/// Settings screen state, rebuilt every time the screen is entered
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsScreen {
    pub cursor: MenuCursor,
    pub capture: Option<KeyCapture>,
}

impl Default for SettingsScreen {
    fn default() -> Self {
        Self {
            cursor: MenuCursor::clamped(SettingsRow::ALL.len()),
            capture: None,
        }
    }
}

impl SettingsScreen {
    pub fn row(&self) -> SettingsRow {
        SettingsRow::ALL
            .get(self.cursor.selected())
            .copied()
            .unwrap_or(SettingsRow::Sound)
    }
}

/// Result of a finished run, shown on the game over screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub cause: RunEndCause,
    pub score: f64,
    pub distance: f64,
    pub new_record: bool,
}

/// Top-level modes with their screen-local state
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Waiting for the first input (unlocks audio)
    Boot,
    /// Play / How to play / Settings
    Title { menu: MenuCursor },
    HowTo,
    Settings(SettingsScreen),
    Playing,
    /// Resume / Restart / Title
    Paused { menu: MenuCursor },
    /// Play again / Title
    GameOver { menu: MenuCursor, summary: RunSummary },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Boot,
    Title,
    HowTo,
    Settings,
    Playing,
    Paused,
    GameOver,
}

impl Mode {
    pub fn title() -> Self {
        Mode::Title {
            menu: MenuCursor::wrapping(3),
        }
    }

    pub fn paused() -> Self {
        Mode::Paused {
            menu: MenuCursor::wrapping(3),
        }
    }

    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Boot => ModeKind::Boot,
            Mode::Title { .. } => ModeKind::Title,
            Mode::HowTo => ModeKind::HowTo,
            Mode::Settings(_) => ModeKind::Settings,
            Mode::Playing => ModeKind::Playing,
            Mode::Paused { .. } => ModeKind::Paused,
            Mode::GameOver { .. } => ModeKind::GameOver,
        }
    }
}

/// Camera shake after hits
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraShake {
    time_ms: f32,
    offset: Vec2,
}

impl CameraShake {
    /// Extend the shake to at least `duration_ms`; ignored while disabled
    pub fn add(&mut self, duration_ms: f32, enabled: bool) {
        if enabled {
            self.time_ms = self.time_ms.max(duration_ms);
        }
    }

    /// Offsets shrink with the remaining time and are zero while disabled
    pub fn update(&mut self, dt: f32, enabled: bool, rng: &mut GameRng) {
        if self.time_ms <= 0.0 {
            self.offset = Vec2::ZERO;
            return;
        }
        self.time_ms = (self.time_ms - dt).max(0.0);
        self.offset = if enabled {
            let scale = SHAKE_AMPLITUDE * (self.time_ms / HIT_SHAKE_MS);
            Vec2::new(
                (rng.next_f32() - 0.5) * scale,
                (rng.next_f32() - 0.5) * scale,
            )
        } else {
            Vec2::ZERO
        };
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn remaining_ms(&self) -> f32 {
        self.time_ms
    }
}

/// The whole game: modes, run, services and the frame driver
pub struct Game {
    mode: Mode,
    run: Option<RunState>,
    settings: Settings,
    high_scores: HighScores,
    input: InputLayer,
    clock: FixedStep,
    /// Gameplay randomness (spawns, effect seeds)
    rng: GameRng,
    /// Camera shake only
    fx_rng: GameRng,
    audio: Box<dyn AudioSink>,
    persistence: Persistence,
    shake: CameraShake,
    road_offset: f32,
    debug: bool,
    /// Simulation time, advanced by one fixed step per tick
    sim_time_ms: f64,
    /// Latest frame timestamp, on the same clock as touch events
    frame_time_ms: f64,
    ticks: u64,
}

impl Game {
    /// Build a game from its services; `seed` fixes all gameplay randomness
    pub fn new(services: Services, seed: Option<u64>) -> Self {
        let Services { mut audio, store } = services;
        let persistence = Persistence::new(store);
        let settings = persistence.load_settings();
        let high_scores = persistence.load_high_scores();
        let keymap = KeyMap::with_overrides(persistence.load_keybinds());
        audio.update_volumes(&settings);

        let rng = GameRng::from_seed_or_entropy(seed);
        let fx_rng = GameRng::new(rng.seed() ^ FX_SEED_SALT);
        log::info!(
            "Game ready (seed {}, difficulty {})",
            rng.seed(),
            settings.difficulty.as_str()
        );

        Self {
            mode: Mode::Boot,
            run: None,
            settings,
            high_scores,
            input: InputLayer::new(keymap),
            clock: FixedStep::default(),
            rng,
            fx_rng,
            audio,
            persistence,
            shake: CameraShake::default(),
            road_offset: 0.0,
            debug: false,
            sim_time_ms: 0.0,
            frame_time_ms: 0.0,
            ticks: 0,
        }
    }

    // === Accessors ===

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn mode_kind(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn run(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    pub fn keymap(&self) -> &KeyMap {
        self.input.keymap()
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn shake_offset(&self) -> Vec2 {
        self.shake.offset()
    }

    pub fn road_offset(&self) -> f32 {
        self.road_offset
    }

    pub fn view(&self) -> GameView<'_> {
        GameView {
            mode: &self.mode,
            run: self.run.as_ref(),
            settings: &self.settings,
            high_scores: &self.high_scores,
            keymap: self.input.keymap(),
            palette: Palette::for_settings(&self.settings),
            shake: self.shake.offset(),
            road_offset: self.road_offset,
            debug: self.debug,
        }
    }

    // === Driver ===

    /// Run one display frame at monotonic time `now`
    ///
    /// Returns the number of fixed ticks executed (0, 1 or several). The
    /// renderer is called exactly once either way.
    pub fn frame(&mut self, now: Duration, raw: &RawInput, renderer: &mut dyn RenderSink) -> u32 {
        self.frame_time_ms = now.as_secs_f64() * 1000.0;
        self.input.ingest(raw);

        let ticks = self.clock.advance(now);
        for _ in 0..ticks {
            self.tick();
        }

        renderer.render(&self.view());
        ticks
    }

    /// One fixed simulation step
    pub fn tick(&mut self) {
        let dt = FIXED_DT_MS;
        self.ticks += 1;
        self.sim_time_ms += dt as f64;

        self.input.update(self.frame_time_ms);
        self.shake
            .update(dt, self.settings.shake_enabled(), &mut self.fx_rng);

        match self.mode.kind() {
            ModeKind::Boot => self.update_boot(),
            ModeKind::Title => self.update_title(),
            ModeKind::HowTo => self.update_howto(),
            ModeKind::Settings => self.update_settings(),
            ModeKind::Playing => self.update_playing(dt),
            ModeKind::Paused => self.update_paused(),
            ModeKind::GameOver => self.update_game_over(),
        }

        if let Some(run) = self.run.as_mut() {
            run.age_effects(dt);
        }

        let scroll = match (self.mode.kind(), self.run.as_ref()) {
            (ModeKind::Playing, Some(run)) => Some(run.player.speed * 0.5 * dt / FRAME_MS),
            (ModeKind::Title, _) => Some(dt / FRAME_MS),
            _ => None,
        };
        if let Some(amount) = scroll {
            self.advance_road(amount);
        }
    }

    fn advance_road(&mut self, amount: f32) {
        self.road_offset += amount;
        if self.road_offset > ROAD_DASH_PERIOD {
            self.road_offset = 0.0;
        }
    }

    // === Transitions ===

    /// Enter `mode`, dropping the run when heading back to the menus
    ///
    /// Input is cleared so nothing held across the switch fires in the new mode.
    pub fn set_mode(&mut self, mode: Mode) {
        let from = self.mode.kind();
        let to = mode.kind();
        if matches!(to, ModeKind::Title | ModeKind::HowTo | ModeKind::Settings)
            && self.run.take().is_some()
        {
            self.audio.stop_music();
        }
        self.mode = mode;
        self.input.clear();
        log::info!("Mode {:?} -> {:?}", from, to);
    }

    /// Fresh run on the current difficulty
    pub fn start_run(&mut self) {
        let difficulty = self.settings.difficulty;
        let fx_seed = self.rng.next_u64();
        self.run = Some(RunState::new(difficulty, fx_seed));
        self.shake = CameraShake::default();
        if self.settings.music_enabled {
            self.audio.start_music();
        }
        log::info!("Run started on {}", difficulty.as_str());
        self.set_mode(Mode::Playing);
    }

    fn game_over(&mut self, cause: RunEndCause) {
        self.audio.stop_music();
        self.play(SoundEffect::GameOver);

        let Some(run) = self.run.as_ref() else {
            self.set_mode(Mode::title());
            return;
        };
        let (difficulty, score, distance) = (run.difficulty, run.score, run.distance);
        let new_record = self.high_scores.record(difficulty, score, distance);
        if new_record {
            self.persistence.save_high_score(difficulty, score, distance);
        }
        log::info!(
            "Run over ({}): score {:.0}, distance {:.0}{}",
            cause.as_str(),
            score,
            distance,
            if new_record { ", new record" } else { "" }
        );

        self.set_mode(Mode::GameOver {
            menu: MenuCursor::wrapping(2),
            summary: RunSummary {
                cause,
                score,
                distance,
                new_record,
            },
        });
    }

    fn save_settings(&mut self) {
        self.persistence.save_settings(&self.settings);
        self.persistence
            .save_keybinds(self.input.keymap().overrides());
        self.audio.update_volumes(&self.settings);
    }

    fn play(&mut self, effect: SoundEffect) {
        self.audio.play_sound(effect, &self.settings);
    }

    fn add_shake(&mut self, duration_ms: f32) {
        self.shake.add(duration_ms, self.settings.shake_enabled());
    }

    /// Menus move down on either `down` or `brake`
    fn nav_down(&self) -> bool {
        self.input.just_pressed(Action::Down) || self.input.just_pressed(Action::Brake)
    }

    // === Per-mode updates ===

    fn update_boot(&mut self) {
        if self.input.take_activity() || self.input.just_pressed(Action::Confirm) {
            self.audio.resume();
            self.set_mode(Mode::title());
        }
    }

    fn update_title(&mut self) {
        let now = self.sim_time_ms;
        let confirm = self.input.just_pressed(Action::Confirm);
        let up = self.input.just_pressed(Action::Up);
        let down = self.nav_down();
        let Mode::Title { menu } = &mut self.mode else {
            return;
        };

        if confirm {
            let choice = menu.selected();
            self.play(SoundEffect::Start);
            match choice {
                0 => self.start_run(),
                1 => self.set_mode(Mode::HowTo),
                _ => self.set_mode(Mode::Settings(SettingsScreen::default())),
            }
            return;
        }

        let moved = (up && menu.step(-1, now)) | (down && menu.step(1, now));
        if moved {
            self.play(SoundEffect::Ui);
        }
    }

    fn update_howto(&mut self) {
        if self.input.just_pressed(Action::Confirm) || self.input.just_pressed(Action::Brake) {
            self.play(SoundEffect::Ui);
            self.set_mode(Mode::title());
        }
    }

    fn update_settings(&mut self) {
        let now = self.sim_time_ms;
        let Mode::Settings(screen) = &mut self.mode else {
            return;
        };

        if let Some(capture) = screen.capture.as_mut() {
            let held = self.input.held_codes();
            let fresh = held.difference(&capture.seen).next().cloned();
            match fresh.as_deref() {
                Some("Escape") => {
                    screen.capture = None;
                    self.play(SoundEffect::Ui);
                    self.input.clear();
                }
                Some(code) => {
                    let action = capture.action;
                    screen.capture = None;
                    self.input.set_keybind(action, code);
                    self.play(SoundEffect::Ui);
                    self.input.clear();
                }
                None => capture.seen.clone_from(held),
            }
            return;
        }

        if self.input.just_pressed(Action::Left) || self.input.just_pressed(Action::Pause) {
            self.play(SoundEffect::Ui);
            self.save_settings();
            self.set_mode(Mode::title());
            return;
        }

        let up = self.input.just_pressed(Action::Up);
        let down = self.input.just_pressed(Action::Down) || self.input.just_pressed(Action::Brake);
        let confirm = self.input.just_pressed(Action::Confirm);

        let moved = (up && screen.cursor.step(-1, now)) | (down && screen.cursor.step(1, now));
        let row = screen.row();
        let toggled = confirm && screen.cursor.accept(now);
        if toggled {
            if let SettingsRow::Keybind(action) = row {
                screen.capture = Some(KeyCapture {
                    action,
                    seen: self.input.held_codes().clone(),
                });
            }
        }

        if moved {
            self.play(SoundEffect::Ui);
        }
        if toggled {
            self.play(SoundEffect::Ui);
            self.apply_setting(row);
        }
    }

    fn apply_setting(&mut self, row: SettingsRow) {
        let settings = &mut self.settings;
        match row {
            SettingsRow::Sound => settings.sound_enabled = !settings.sound_enabled,
            SettingsRow::Music => {
                settings.music_enabled = !settings.music_enabled;
                if !settings.music_enabled {
                    self.audio.stop_music();
                }
            }
            SettingsRow::ReducedMotion => settings.reduced_motion = !settings.reduced_motion,
            SettingsRow::Colorblind => settings.colorblind_mode = !settings.colorblind_mode,
            SettingsRow::Difficulty => settings.difficulty = settings.difficulty.next(),
            SettingsRow::TouchLayout => settings.touch_layout = settings.touch_layout.toggled(),
            SettingsRow::Keybind(action) => {
                log::debug!("Waiting for a key to bind to {}", action.as_str());
            }
        }
    }

    fn update_playing(&mut self, dt: f32) {
        if self.input.just_pressed(Action::Pause) {
            self.play(SoundEffect::Ui);
            self.set_mode(Mode::paused());
            return;
        }
        if self.input.just_pressed(Action::Debug) {
            self.debug = !self.debug;
            log::debug!("Debug overlay {}", if self.debug { "on" } else { "off" });
        }

        let input = TickInput {
            left: self.input.held(Action::Left),
            right: self.input.held(Action::Right),
            brake: self.input.held(Action::Brake),
        };
        let Some(run) = self.run.as_mut() else {
            log::warn!("Playing without a run, returning to title");
            self.set_mode(Mode::title());
            return;
        };

        let events = sim::tick(run, &input, &mut self.rng, dt);
        for event in events {
            self.react(event);
        }
    }

    /// Map simulation events to sound, shake and mode changes
    fn react(&mut self, event: GameEvent) {
        match event {
            GameEvent::Crash { .. } => {
                self.play(SoundEffect::Crash);
                self.add_shake(HIT_SHAKE_MS);
            }
            GameEvent::NearMiss { .. } => self.play(SoundEffect::NearMiss),
            GameEvent::PickupCollected { kind, .. } => self.play(match kind {
                PickupKind::Coin => SoundEffect::Coin,
                PickupKind::Heal => SoundEffect::Repair,
                PickupKind::Boost => SoundEffect::Boost,
            }),
            GameEvent::RunEnded { cause } => self.game_over(cause),
        }
    }

    fn update_paused(&mut self) {
        if self.input.just_pressed(Action::Pause) {
            self.play(SoundEffect::Ui);
            self.set_mode(Mode::Playing);
            return;
        }

        let now = self.sim_time_ms;
        let confirm = self.input.just_pressed(Action::Confirm);
        let up = self.input.just_pressed(Action::Up);
        let down = self.nav_down();
        let Mode::Paused { menu } = &mut self.mode else {
            return;
        };

        let moved = (up && menu.step(-1, now)) | (down && menu.step(1, now));
        let choice = menu.selected();
        if moved {
            self.play(SoundEffect::Ui);
        }

        if confirm {
            match choice {
                0 => {
                    self.play(SoundEffect::Start);
                    self.set_mode(Mode::Playing);
                }
                1 => {
                    self.play(SoundEffect::Start);
                    self.start_run();
                }
                _ => {
                    self.play(SoundEffect::Ui);
                    self.set_mode(Mode::title());
                }
            }
        }
    }

    fn update_game_over(&mut self) {
        let now = self.sim_time_ms;
        let confirm = self.input.just_pressed(Action::Confirm);
        let nav = self.input.just_pressed(Action::Up) || self.nav_down();
        let Mode::GameOver { menu, .. } = &mut self.mode else {
            return;
        };

        // Two items: either direction toggles
        let moved = nav && menu.step(1, now);
        let choice = menu.selected();
        if moved {
            self.play(SoundEffect::Ui);
        }

        if confirm {
            if choice == 0 {
                self.play(SoundEffect::Start);
                self.start_run();
            } else {
                self.play(SoundEffect::Ui);
                self.set_mode(Mode::title());
            }
        }
    }
}
