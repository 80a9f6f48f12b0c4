//! Road entities: the player car, obstacles, pickups and cosmetic effects
//!
//! Motion constants were tuned per display frame, so displacement is scaled
//! by `dt / FRAME_MS`; one fixed tick moves an entity exactly one frame's worth.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::rng::GameRng;
use crate::consts::*;
use crate::{ease_out_cubic, lane_center_x, lerp};

/// The player's car
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Lane the car is leaving (or sitting in when no change is active)
    pub lane: usize,
    /// Lane the car is heading to
    pub target_lane: usize,
    pub pos: Vec2,
    pub size: Vec2,
    /// Effective speed this tick (after brake/boost)
    pub speed: f32,
    /// Speed before brake/boost, ramps toward `PLAYER_SPEED_MAX`
    pub base_speed: f32,
    /// 0..1, 1 means no lane change in progress
    pub lane_change_progress: f32,
    pub lane_change_cooldown: f32,
    pub health: u8,
    pub max_health: u8,
    pub invulnerable: bool,
    pub invulnerable_time: f32,
    pub boost_active: bool,
    pub boost_time: f32,
}

impl Player {
    pub fn new(max_health: u8) -> Self {
        let lane = LANES / 2;
        Self {
            lane,
            target_lane: lane,
            pos: Vec2::new(lane_center_x(lane), PLAYER_Y),
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            speed: PLAYER_SPEED_INIT,
            base_speed: PLAYER_SPEED_INIT,
            lane_change_progress: 1.0,
            lane_change_cooldown: 0.0,
            health: max_health,
            max_health,
            invulnerable: false,
            invulnerable_time: 0.0,
            boost_active: false,
            boost_time: 0.0,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn is_changing_lane(&self) -> bool {
        self.lane_change_progress < 1.0
    }

    /// Advance lane change, speed ramp and timers by `dt` ms
    pub fn update(&mut self, dt: f32, braking: bool) {
        let target_x = lane_center_x(self.target_lane);
        if self.is_changing_lane() {
            self.lane_change_progress += dt / LANE_CHANGE_DURATION_MS;
            if self.lane_change_progress >= 1.0 {
                self.lane_change_progress = 1.0;
                self.lane = self.target_lane;
            }
            self.pos.x = lerp(
                lane_center_x(self.lane),
                target_x,
                ease_out_cubic(self.lane_change_progress),
            );
        } else {
            self.pos.x = target_x;
        }

        if self.lane_change_cooldown > 0.0 {
            self.lane_change_cooldown = (self.lane_change_cooldown - dt).max(0.0);
        }

        self.base_speed = (self.base_speed + PLAYER_SPEED_INC).min(PLAYER_SPEED_MAX);

        // Boost wins over the brake
        self.speed = if self.boost_active {
            self.base_speed * BOOST_MULTIPLIER
        } else if braking {
            self.base_speed * BRAKE_MULTIPLIER
        } else {
            self.base_speed
        };

        if self.boost_active {
            self.boost_time -= dt;
            if self.boost_time <= 0.0 {
                self.boost_active = false;
                self.boost_time = 0.0;
            }
        }

        if self.invulnerable {
            self.invulnerable_time -= dt;
            if self.invulnerable_time <= 0.0 {
                self.invulnerable = false;
                self.invulnerable_time = 0.0;
            }
        }
    }

    /// Request a move of `direction` lanes (-1 left, +1 right)
    ///
    /// Rejected while a change is running, during cooldown, or when the
    /// target would leave the road. Returns whether the request was taken.
    pub fn try_change_lane(&mut self, direction: isize) -> bool {
        if self.is_changing_lane() || self.lane_change_cooldown > 0.0 {
            return false;
        }
        match self.target_lane.checked_add_signed(direction) {
            Some(lane) if lane < LANES => {
                self.target_lane = lane;
                self.lane_change_progress = 0.0;
                self.lane_change_cooldown = LANE_CHANGE_COOLDOWN_MS;
                true
            }
            _ => false,
        }
    }

    /// Apply one hit. No-op while invulnerable. Returns true if the hit was fatal.
    pub fn take_damage(&mut self) -> bool {
        if self.invulnerable {
            return false;
        }
        self.health = self.health.saturating_sub(1);
        self.invulnerable = true;
        self.invulnerable_time = INVULNERABILITY_MS;
        self.health == 0
    }

    /// Restore one health point. Returns false (and changes nothing) at full health.
    pub fn heal(&mut self) -> bool {
        if self.health < self.max_health {
            self.health += 1;
            true
        } else {
            false
        }
    }

    pub fn activate_boost(&mut self, duration: f32) {
        self.boost_active = true;
        self.boost_time = duration;
    }
}

/// How an obstacle moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObstacleKind {
    /// Moves with the road
    Plain,
    /// Larger and slower (x0.7)
    Slow,
    /// Sways sideways around its lane center
    Weaving,
    /// Telegraphs for a while, then rushes in (x1.3)
    Burst,
}

impl ObstacleKind {
    pub fn size(self) -> Vec2 {
        match self {
            ObstacleKind::Slow => Vec2::new(SLOW_OBSTACLE_WIDTH, SLOW_OBSTACLE_HEIGHT),
            _ => Vec2::new(OBSTACLE_WIDTH, OBSTACLE_HEIGHT),
        }
    }
}

/// An obstacle car coming down a lane
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: u32,
    pub lane: usize,
    pub kind: ObstacleKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub weave_time: f32,
    pub weave_offset: f32,
    /// Burst obstacles hold this until `burst_time` runs out
    pub burst_warning: bool,
    pub burst_time: f32,
    /// Set once this obstacle has paid out a near-miss bonus
    pub near_miss_awarded: bool,
}

impl Obstacle {
    pub fn new(id: u32, lane: usize, kind: ObstacleKind) -> Self {
        Self {
            id,
            lane,
            kind,
            pos: Vec2::new(lane_center_x(lane), OBSTACLE_SPAWN_Y),
            size: kind.size(),
            speed: 0.0,
            weave_time: 0.0,
            weave_offset: 0.0,
            burst_warning: kind == ObstacleKind::Burst,
            burst_time: BURST_WARNING_MS,
            near_miss_awarded: false,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn update(&mut self, dt: f32, player_speed: f32) {
        self.speed = match self.kind {
            ObstacleKind::Slow => player_speed * SLOW_SPEED_FACTOR,
            ObstacleKind::Burst => {
                if self.burst_warning {
                    self.burst_time -= dt;
                    if self.burst_time <= 0.0 {
                        self.burst_warning = false;
                    }
                }
                if self.burst_warning {
                    player_speed
                } else {
                    player_speed * BURST_SPEED_FACTOR
                }
            }
            ObstacleKind::Plain | ObstacleKind::Weaving => player_speed,
        };

        self.pos.y += self.speed * dt / FRAME_MS;

        if self.kind == ObstacleKind::Weaving {
            self.weave_time += dt * WEAVE_RATE;
            self.weave_offset = self.weave_time.sin() * WEAVE_AMPLITUDE;
            self.pos.x = lane_center_x(self.lane) + self.weave_offset;
        }
    }

    pub fn is_offscreen(&self) -> bool {
        self.pos.y > FIELD_HEIGHT + OFFSCREEN_MARGIN
    }
}

/// What a pickup gives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PickupKind {
    /// Score bonus
    Coin,
    /// One health point
    Heal,
    /// Double score bonus plus a temporary speed boost
    Boost,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pickup {
    pub id: u32,
    pub lane: usize,
    pub kind: PickupKind,
    pub pos: Vec2,
    pub size: Vec2,
    /// Spin angle for rendering (radians)
    pub rotation: f32,
}

impl Pickup {
    pub fn new(id: u32, lane: usize, kind: PickupKind) -> Self {
        Self {
            id,
            lane,
            kind,
            pos: Vec2::new(lane_center_x(lane), PICKUP_SPAWN_Y),
            size: Vec2::splat(PICKUP_SIZE),
            rotation: 0.0,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn update(&mut self, dt: f32, player_speed: f32) {
        self.pos.y += player_speed * dt / FRAME_MS;
        self.rotation += dt * PICKUP_SPIN_RATE;
    }

    pub fn is_offscreen(&self) -> bool {
        self.pos.y > FIELD_HEIGHT + OFFSCREEN_MARGIN
    }
}

/// Palette slot a cosmetic effect is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectColor {
    Crash,
    NearMiss,
    Coin,
    Heal,
    Boost,
}

/// A spark flying out of a hit or near miss
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    pub color: EffectColor,
}

impl Particle {
    /// A burst of sparks around `pos`
    pub fn burst(pos: Vec2, color: EffectColor, rng: &mut GameRng) -> Vec<Particle> {
        (0..PARTICLE_BURST)
            .map(|_| {
                let vel = Vec2::new(rng.range(-5.0, 5.0), rng.range(-5.0, 5.0));
                let life = rng.range(500.0, 1000.0);
                Particle {
                    pos,
                    vel,
                    life,
                    max_life: life,
                    size: rng.range(5.0, 10.0),
                    color,
                }
            })
            .collect()
    }

    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt * 0.1;
        self.life -= dt;
        self.vel *= 0.98;
    }

    pub fn is_dead(&self) -> bool {
        self.life <= 0.0
    }

    pub fn alpha(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

/// Score popup drifting upward
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingText {
    pub pos: Vec2,
    pub text: String,
    pub color: EffectColor,
    pub life: f32,
    pub max_life: f32,
}

impl FloatingText {
    pub fn new(pos: Vec2, text: impl Into<String>, color: EffectColor) -> Self {
        Self {
            pos,
            text: text.into(),
            color,
            life: FLOATING_TEXT_MS,
            max_life: FLOATING_TEXT_MS,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.pos.y -= 0.5 * dt * 0.1;
        self.life -= dt;
    }

    pub fn is_dead(&self) -> bool {
        self.life <= 0.0
    }

    /// Fully opaque until the last 30% of its life
    pub fn alpha(&self) -> f32 {
        (self.life / (self.max_life * 0.3)).clamp(0.0, 1.0)
    }
}
