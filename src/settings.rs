//! Game settings and preferences
//!
//! Persisted separately from high scores; see `persistence`.

use serde::{Deserialize, Serialize};

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    /// Cycle easy -> normal -> hard -> easy
    pub fn next(&self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Normal,
            Difficulty::Normal => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    /// Scales the obstacle spawn interval (shorter is harder)
    pub fn spawn_interval_factor(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.2,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.8,
        }
    }

    pub fn starting_health(&self) -> u8 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Normal => 3,
            Difficulty::Hard => 2,
        }
    }

    /// Highest multiplier reachable
    pub fn multiplier_ceiling(&self) -> f32 {
        match self {
            Difficulty::Hard => crate::consts::MULTIPLIER_MAX * 1.5,
            _ => crate::consts::MULTIPLIER_MAX,
        }
    }
}

/// On-screen touch control layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum TouchLayout {
    #[default]
    Standard,
    /// Adds a dedicated brake button
    WithBrake,
}

impl TouchLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            TouchLayout::Standard => "Standard",
            TouchLayout::WithBrake => "With Brake",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            TouchLayout::Standard => TouchLayout::WithBrake,
            TouchLayout::WithBrake => TouchLayout::Standard,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    // === Audio ===
    pub sound_enabled: bool,
    pub music_enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,

    // === Accessibility ===
    /// Reduced motion (no camera shake)
    pub reduced_motion: bool,
    /// Alternate palette, render only
    pub colorblind_mode: bool,

    // === Gameplay ===
    pub difficulty: Difficulty,
    pub touch_layout: TouchLayout,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            music_enabled: true,
            master_volume: 0.7,
            sfx_volume: 0.8,
            music_volume: 0.5,

            reduced_motion: false,
            colorblind_mode: false,

            difficulty: Difficulty::Normal,
            touch_layout: TouchLayout::Standard,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn shake_enabled(&self) -> bool {
        !self.reduced_motion
    }

    /// Clamp volumes into 0..=1; non-finite values fall back to defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.master_volume = clamp_volume(self.master_volume, defaults.master_volume);
        self.sfx_volume = clamp_volume(self.sfx_volume, defaults.sfx_volume);
        self.music_volume = clamp_volume(self.music_volume, defaults.music_volume);
        self
    }

    /// Final gain for sound effects
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.sound_enabled {
            self.master_volume * self.sfx_volume
        } else {
            0.0
        }
    }

    /// Final gain for music
    pub fn effective_music_volume(&self) -> f32 {
        if self.music_enabled {
            self.master_volume * self.music_volume
        } else {
            0.0
        }
    }
}

fn clamp_volume(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.sound_enabled && s.music_enabled);
        assert!(!s.reduced_motion && !s.colorblind_mode);
        assert_eq!(s.difficulty, Difficulty::Normal);
        assert_eq!(s.touch_layout, TouchLayout::Standard);
        assert!(s.shake_enabled());
        let calm = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert!(!calm.shake_enabled());
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["colorblindMode"], false);
        assert_eq!(json["difficulty"], "normal");
        assert_eq!(json["touchLayout"], "standard");
        assert!(json.get("masterVolume").is_some());
    }

    #[test]
    fn test_missing_fields_default() {
        let s: Settings =
            serde_json::from_str(r#"{"difficulty":"hard","touchLayout":"withBrake"}"#).unwrap();
        assert_eq!(s.difficulty, Difficulty::Hard);
        assert_eq!(s.touch_layout, TouchLayout::WithBrake);
        assert!(s.sound_enabled);
        assert_eq!(s.music_volume, 0.5);
    }

    #[test]
    fn test_difficulty_table() {
        assert_eq!(Difficulty::Easy.starting_health(), 5);
        assert_eq!(Difficulty::Normal.starting_health(), 3);
        assert_eq!(Difficulty::Hard.starting_health(), 2);
        assert_eq!(Difficulty::Normal.multiplier_ceiling(), 10.0);
        assert_eq!(Difficulty::Hard.multiplier_ceiling(), 15.0);
        assert_eq!(Difficulty::Easy.spawn_interval_factor(), 1.2);

        assert_eq!(Difficulty::Hard.next(), Difficulty::Easy);
    }

    #[test]
    fn test_sanitized_volumes() {
        let s = Settings {
            master_volume: 3.0,
            sfx_volume: -1.0,
            music_volume: f32::NAN,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(s.master_volume, 1.0);
        assert_eq!(s.sfx_volume, 0.0);
        assert_eq!(s.music_volume, 0.5);
    }

    #[test]
    fn test_effective_volume() {
        let mut s = Settings::default();
        assert!((s.effective_sfx_volume() - 0.56).abs() < 1e-6);
        s.sound_enabled = false;
        assert_eq!(s.effective_sfx_volume(), 0.0);
        s.music_enabled = false;
        assert_eq!(s.effective_music_volume(), 0.0);
    }
}
