//! Render collaborator interface
//!
//! The game hands a read-only `GameView` to a `RenderSink` once per frame.
//! Nothing drawn feeds back into the simulation.

pub mod palette;

use glam::Vec2;

pub use palette::Palette;

use crate::app::Mode;
use crate::highscores::HighScores;
use crate::platform::input::KeyMap;
use crate::settings::Settings;
use crate::sim::RunState;

/// Snapshot of everything a frame needs
#[derive(Debug, Clone, Copy)]
pub struct GameView<'a> {
    pub mode: &'a Mode,
    /// Present while playing, paused, or on the game over screen
    pub run: Option<&'a RunState>,
    pub settings: &'a Settings,
    pub high_scores: &'a HighScores,
    pub keymap: &'a KeyMap,
    pub palette: &'static Palette,
    /// Camera offset in pixels, zero under reduced motion
    pub shake: Vec2,
    /// Road dash scroll, 0..ROAD_DASH_PERIOD
    pub road_offset: f32,
    pub debug: bool,
}

/// HUD figures, formatted for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hud {
    pub score: String,
    pub distance: String,
    pub multiplier: String,
    pub health: String,
}

impl GameView<'_> {
    pub fn hud(&self) -> Option<Hud> {
        let run = self.run?;
        Some(Hud {
            score: format!("{}", run.score.floor()),
            distance: format!("{}m", run.distance.floor()),
            multiplier: format!("x{:.1}", run.multiplier.value()),
            health: format!("{}/{}", run.player.health, run.player.max_health),
        })
    }
}

/// Something that draws frames
pub trait RenderSink {
    fn render(&mut self, view: &GameView<'_>);
}

/// Draws nothing
#[derive(Debug, Default)]
pub struct NullRenderer;

impl RenderSink for NullRenderer {
    fn render(&mut self, _view: &GameView<'_>) {}
}
