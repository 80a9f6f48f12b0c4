//! Color palettes
//!
//! Two fixed mappings: the default one and a colorblind-friendly one with
//! stronger hue separation between obstacle types. Render only.

use crate::settings::Settings;
use crate::sim::{EffectColor, ObstacleKind, PickupKind};

/// `0xRRGGBB` to linear-ish RGBA floats
const fn hex(rgb: u32, alpha: f32) -> [f32; 4] {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        alpha,
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: [f32; 4],
    pub road: [f32; 4],
    pub road_line: [f32; 4],
    pub road_dash: [f32; 4],
    pub player: [f32; 4],
    /// Plain, slow, weaving, burst
    pub obstacles: [[f32; 4]; 4],
    pub coin: [f32; 4],
    pub heal: [f32; 4],
    pub boost: [f32; 4],
    pub near_miss: [f32; 4],
    pub crash: [f32; 4],
    pub text: [f32; 4],
    pub hud_background: [f32; 4],
}

pub const NORMAL: Palette = Palette {
    background: hex(0x1a1a2e, 1.0),
    road: hex(0x16213e, 1.0),
    road_line: hex(0x0f3460, 1.0),
    road_dash: hex(0xe94560, 1.0),
    player: hex(0x00d4ff, 1.0),
    obstacles: [
        hex(0xff6b6b, 1.0),
        hex(0xffa500, 1.0),
        hex(0x9b59b6, 1.0),
        hex(0xff1744, 1.0),
    ],
    coin: hex(0xffd700, 1.0),
    heal: hex(0xff1493, 1.0),
    boost: hex(0x00ff00, 1.0),
    near_miss: hex(0x00ffff, 1.0),
    crash: hex(0xff0000, 1.0),
    text: hex(0xffffff, 1.0),
    hud_background: hex(0x000000, 0.7),
};

pub const COLORBLIND: Palette = Palette {
    background: hex(0x1a1a1a, 1.0),
    road: hex(0x2a2a2a, 1.0),
    road_line: hex(0x1a1a1a, 1.0),
    road_dash: hex(0xffff00, 1.0),
    player: hex(0x00ffff, 1.0),
    obstacles: [
        hex(0xff4444, 1.0),
        hex(0xff8800, 1.0),
        hex(0xaa44ff, 1.0),
        hex(0xff0044, 1.0),
    ],
    coin: hex(0xffff44, 1.0),
    heal: hex(0xff44ff, 1.0),
    boost: hex(0x44ff44, 1.0),
    near_miss: hex(0x00ffff, 1.0),
    crash: hex(0xff0000, 1.0),
    text: hex(0xffffff, 1.0),
    hud_background: hex(0x000000, 0.8),
};

impl Palette {
    pub fn for_settings(settings: &Settings) -> &'static Palette {
        if settings.colorblind_mode {
            &COLORBLIND
        } else {
            &NORMAL
        }
    }

    pub fn obstacle(&self, kind: ObstacleKind) -> [f32; 4] {
        match kind {
            ObstacleKind::Plain => self.obstacles[0],
            ObstacleKind::Slow => self.obstacles[1],
            ObstacleKind::Weaving => self.obstacles[2],
            ObstacleKind::Burst => self.obstacles[3],
        }
    }

    pub fn pickup(&self, kind: PickupKind) -> [f32; 4] {
        match kind {
            PickupKind::Coin => self.coin,
            PickupKind::Heal => self.heal,
            PickupKind::Boost => self.boost,
        }
    }

    pub fn effect(&self, color: EffectColor) -> [f32; 4] {
        match color {
            EffectColor::Crash => self.crash,
            EffectColor::NearMiss => self.near_miss,
            EffectColor::Coin => self.coin,
            EffectColor::Heal => self.heal,
            EffectColor::Boost => self.boost,
        }
    }
}
