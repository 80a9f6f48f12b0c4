//! Flipphone Racer - an arcade lane-driving game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, collisions, scoring)
//! - `app`: Application mode machine and fixed-step frame driver
//! - `platform`: Input actions, frame timing and key-value storage
//! - `persistence`: Settings, high scores and keybinds on top of storage
//! - `audio`: Sound collaborator interface
//! - `renderer`: Read-only view handed to the drawing collaborator

pub mod app;
pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use app::{Game, Mode, ModeKind, Services};
pub use highscores::HighScores;
pub use settings::{Difficulty, Settings, TouchLayout};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz logic)
    pub const FIXED_DT_MS: f32 = 1000.0 / 60.0;
    /// Reference frame length the per-tick motion constants were tuned for
    pub const FRAME_MS: f32 = 1000.0 / 60.0;
    /// Largest wall-clock delta accepted per frame
    pub const MAX_FRAME_DELTA_MS: u64 = 100;

    /// Playfield
    pub const FIELD_WIDTH: f32 = 600.0;
    pub const FIELD_HEIGHT: f32 = 650.0;
    pub const LANES: usize = 5;
    pub const LANE_WIDTH: f32 = 100.0;
    pub const ROAD_X: f32 = 50.0;
    pub const ROAD_WIDTH: f32 = 500.0;
    /// Entities are dropped once they pass this far below the field
    pub const OFFSCREEN_MARGIN: f32 = 20.0;

    /// Player
    pub const PLAYER_WIDTH: f32 = 70.0;
    pub const PLAYER_HEIGHT: f32 = 100.0;
    pub const PLAYER_Y: f32 = FIELD_HEIGHT - 140.0;
    pub const PLAYER_SPEED_INIT: f32 = 2.0;
    pub const PLAYER_SPEED_MAX: f32 = 8.0;
    /// Base speed gained every tick
    pub const PLAYER_SPEED_INC: f32 = 0.001;
    pub const LANE_CHANGE_DURATION_MS: f32 = 180.0;
    pub const LANE_CHANGE_COOLDOWN_MS: f32 = 120.0;
    pub const BRAKE_MULTIPLIER: f32 = 0.7;
    pub const BOOST_MULTIPLIER: f32 = 1.5;
    pub const BOOST_DURATION_MS: f32 = 3000.0;
    pub const INVULNERABILITY_MS: f32 = 1200.0;

    /// Obstacles
    pub const OBSTACLE_WIDTH: f32 = 70.0;
    pub const OBSTACLE_HEIGHT: f32 = 100.0;
    pub const SLOW_OBSTACLE_WIDTH: f32 = 85.0;
    pub const SLOW_OBSTACLE_HEIGHT: f32 = 120.0;
    pub const OBSTACLE_SPAWN_Y: f32 = -100.0;
    pub const SLOW_SPEED_FACTOR: f32 = 0.7;
    pub const BURST_SPEED_FACTOR: f32 = 1.3;
    pub const BURST_WARNING_MS: f32 = 600.0;
    pub const WEAVE_RATE: f32 = 0.005;
    pub const WEAVE_AMPLITUDE: f32 = 15.0;

    /// Pickups
    pub const PICKUP_SIZE: f32 = 50.0;
    pub const PICKUP_SPAWN_Y: f32 = -50.0;
    pub const PICKUP_SPIN_RATE: f32 = 0.01;

    /// Spawn scheduling
    pub const OBSTACLE_SPAWN_INIT_MS: f32 = 1800.0;
    pub const OBSTACLE_SPAWN_MIN_MS: f32 = 800.0;
    /// Interval shrink per unit of distance travelled
    pub const OBSTACLE_SPAWN_DECREASE: f32 = 0.0002;
    pub const PICKUP_SPAWN_INTERVAL_MS: f32 = 3000.0;
    /// Lanes with an obstacle above this y are not used for new obstacles
    pub const OBSTACLE_SPAWN_BAND: f32 = 100.0;
    /// Lanes with an obstacle above this y are not used for new pickups
    pub const PICKUP_SPAWN_BAND: f32 = 150.0;

    /// Collision
    pub const NEAR_MISS_MARGIN: f32 = 25.0;
    pub const NEAR_MISS_BAND: f32 = 20.0;
    pub const NEAR_MISS_INNER_TOLERANCE: f32 = 5.0;

    /// Scoring
    pub const DISTANCE_PER_SPEED_MS: f64 = 0.01;
    pub const SCORE_DISTANCE_MULT: f64 = 0.1;
    pub const SCORE_COIN: f32 = 100.0;
    pub const SCORE_NEAR_MISS: f32 = 500.0;
    pub const MULTIPLIER_STEP: f32 = 0.5;
    pub const MULTIPLIER_DECAY_STEP: f32 = 0.1;
    pub const MULTIPLIER_MAX: f32 = 10.0;
    pub const MULTIPLIER_DECAY_MS: f32 = 3000.0;

    /// Feedback
    pub const HIT_SHAKE_MS: f32 = 500.0;
    pub const SHAKE_AMPLITUDE: f32 = 5.0;
    pub const PARTICLE_BURST: usize = 10;
    pub const FLOATING_TEXT_MS: f32 = 1000.0;
    pub const ROAD_DASH_PERIOD: f32 = 70.0;

    /// Menus
    pub const MENU_DEBOUNCE_MS: f64 = 200.0;

    /// Touch gestures
    pub const TAP_MAX_DISTANCE: f32 = 50.0;
    pub const SWIPE_THRESHOLD: f32 = 50.0;
    /// Taps and swipes must finish within this many ms
    pub const GESTURE_MAX_MS: f64 = 300.0;
    /// A recognized swipe holds left/right for this long
    pub const SWIPE_HOLD_MS: f64 = 200.0;
}

use consts::{LANE_WIDTH, ROAD_X};

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic ease-out: fast start, gentle settle
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Horizontal center of a lane in field coordinates
#[inline]
pub fn lane_center_x(lane: usize) -> f32 {
    ROAD_X + LANE_WIDTH / 2.0 + lane as f32 * LANE_WIDTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        // Ease-out runs ahead of linear in the middle
        assert!(ease_out_cubic(0.5) > 0.5);
    }

    #[test]
    fn test_lane_centers() {
        assert_eq!(lane_center_x(0), 100.0);
        assert_eq!(lane_center_x(2), 300.0);
        assert_eq!(lane_center_x(consts::LANES - 1), 500.0);
        assert_eq!(lerp(100.0, 200.0, 0.25), 125.0);
    }
}
