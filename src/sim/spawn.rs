//! Procedural placement of obstacles and pickups
//!
//! Two accumulators run independently. When one reaches its interval a spawn
//! is attempted and the accumulator resets, whether or not a lane was free.

use super::arena::EntityList;
use super::entity::{Obstacle, ObstacleKind, PickupKind};
use super::rng::GameRng;
use crate::consts::*;
use crate::settings::Difficulty;

/// Which spawns came due this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnDue {
    pub obstacle: bool,
    pub pickup: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnScheduler {
    pub obstacle_elapsed: f32,
    pub pickup_elapsed: f32,
    pub obstacle_base_interval: f32,
    pub pickup_interval: f32,
}

impl Default for SpawnScheduler {
    fn default() -> Self {
        Self {
            obstacle_elapsed: 0.0,
            pickup_elapsed: 0.0,
            obstacle_base_interval: OBSTACLE_SPAWN_INIT_MS,
            pickup_interval: PICKUP_SPAWN_INTERVAL_MS,
        }
    }
}

impl SpawnScheduler {
    /// Current obstacle interval in ms; shrinks with distance, scaled by difficulty
    pub fn obstacle_interval(&self, distance: f64, difficulty: Difficulty) -> f32 {
        let shrink = (distance * OBSTACLE_SPAWN_DECREASE as f64) as f32;
        (self.obstacle_base_interval - shrink).max(OBSTACLE_SPAWN_MIN_MS)
            * difficulty.spawn_interval_factor()
    }

    /// Advance both timers by `dt` ms and report which spawns are due
    pub fn advance(&mut self, dt: f32, distance: f64, difficulty: Difficulty) -> SpawnDue {
        let mut due = SpawnDue::default();

        self.obstacle_elapsed += dt;
        if self.obstacle_elapsed >= self.obstacle_interval(distance, difficulty) {
            self.obstacle_elapsed = 0.0;
            due.obstacle = true;
        }

        self.pickup_elapsed += dt;
        if self.pickup_elapsed >= self.pickup_interval {
            self.pickup_elapsed = 0.0;
            due.pickup = true;
        }

        due
    }
}

/// Lanes with no live obstacle above `band`
pub fn free_lanes(obstacles: &EntityList<Obstacle>, band: f32) -> Vec<usize> {
    let mut occupied = [false; LANES];
    for obstacle in obstacles.iter_live() {
        if obstacle.pos.y < band {
            if let Some(slot) = occupied.get_mut(obstacle.lane) {
                *slot = true;
            }
        }
    }
    (0..LANES).filter(|&lane| !occupied[lane]).collect()
}

/// Map a uniform draw onto the obstacle mix
pub fn obstacle_kind_for(roll: f32) -> ObstacleKind {
    if roll < 0.4 {
        ObstacleKind::Plain
    } else if roll < 0.6 {
        ObstacleKind::Slow
    } else if roll < 0.85 {
        ObstacleKind::Weaving
    } else {
        ObstacleKind::Burst
    }
}

/// Map a uniform draw onto the pickup mix
pub fn pickup_kind_for(roll: f32) -> PickupKind {
    if roll < 0.6 {
        PickupKind::Coin
    } else if roll < 0.85 {
        PickupKind::Heal
    } else {
        PickupKind::Boost
    }
}

/// Pick a lane and type for a new obstacle, `None` when every lane is blocked
pub fn plan_obstacle(
    obstacles: &EntityList<Obstacle>,
    rng: &mut GameRng,
) -> Option<(usize, ObstacleKind)> {
    let lanes = free_lanes(obstacles, OBSTACLE_SPAWN_BAND);
    let lane = *rng.choose(&lanes)?;
    Some((lane, obstacle_kind_for(rng.next_f32())))
}

/// Pick a lane and type for a new pickup, `None` when every lane is blocked
pub fn plan_pickup(
    obstacles: &EntityList<Obstacle>,
    rng: &mut GameRng,
) -> Option<(usize, PickupKind)> {
    let lanes = free_lanes(obstacles, PICKUP_SPAWN_BAND);
    let lane = *rng.choose(&lanes)?;
    Some((lane, pickup_kind_for(rng.next_f32())))
}
