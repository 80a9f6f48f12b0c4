//! Fixed timestep simulation tick
//!
//! Advances a running `RunState` by one step: player, distance and score,
//! spawning, then obstacles and pickups against the player.

use super::collision::is_near_miss;
use super::entity::{EffectColor, PickupKind};
use super::rng::GameRng;
use super::spawn::{plan_obstacle, plan_pickup};
use super::state::{GameEvent, RunEndCause, RunState};
use crate::consts::*;

/// Held actions that matter while driving (deterministic per tick)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Steer one lane left
    pub left: bool,
    /// Steer one lane right
    pub right: bool,
    pub brake: bool,
}

/// Advance the run by one fixed timestep of `dt` ms
///
/// Gameplay randomness (spawn lanes and types) comes from `rng` only.
/// Returns what happened this tick, in order.
pub fn tick(run: &mut RunState, input: &TickInput, rng: &mut GameRng, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if run.is_over() {
        return events;
    }

    run.time_ticks += 1;

    if input.left {
        run.player.try_change_lane(-1);
    }
    if input.right {
        run.player.try_change_lane(1);
    }
    run.player.update(dt, input.brake);

    let travelled = run.player.speed as f64 * dt as f64 * DISTANCE_PER_SPEED_MS;
    run.distance += travelled;
    run.score += travelled * SCORE_DISTANCE_MULT * run.multiplier.value() as f64;

    run.multiplier.advance(dt);

    let due = run.spawner.advance(dt, run.distance, run.difficulty);
    if due.obstacle {
        match plan_obstacle(&run.obstacles, rng) {
            Some((lane, kind)) => {
                let id = run.spawn_obstacle(lane, kind);
                log::debug!("Spawned obstacle {} ({:?}) in lane {}", id, kind, lane);
            }
            None => log::debug!("All lanes blocked, obstacle spawn skipped"),
        }
    }
    if due.pickup {
        if let Some((lane, kind)) = plan_pickup(&run.obstacles, rng) {
            let id = run.spawn_pickup(lane, kind);
            log::debug!("Spawned pickup {} ({:?}) in lane {}", id, kind, lane);
        }
    }

    update_obstacles(run, dt, &mut events);
    if !run.is_over() {
        update_pickups(run, dt, &mut events);
    }

    run.obstacles.compact();
    run.pickups.compact();

    events
}

fn update_obstacles(run: &mut RunState, dt: f32, events: &mut Vec<GameEvent>) {
    let player_speed = run.player.speed;
    let player_box = run.player.bounds();

    for index in 0..run.obstacles.len() {
        let Some(obstacle) = run.obstacles.get_mut(index) else {
            continue;
        };
        obstacle.update(dt, player_speed);

        let bounds = obstacle.bounds();
        let pos = obstacle.pos;
        let hit = player_box.overlaps(&bounds);
        // A hit is never also a miss, and each obstacle pays out once
        let near_miss =
            !hit && !obstacle.near_miss_awarded && is_near_miss(&player_box, &bounds);
        if near_miss {
            obstacle.near_miss_awarded = true;
        }
        let offscreen = obstacle.is_offscreen();

        if hit {
            let was_invulnerable = run.player.invulnerable;
            if run.player.take_damage() {
                run.obstacles.mark_removed(index);
                run.ended = Some(RunEndCause::Crash);
                events.push(GameEvent::RunEnded {
                    cause: RunEndCause::Crash,
                });
                return;
            }
            // Sustained overlap while invulnerable stays quiet
            if !was_invulnerable {
                run.add_particles(pos, EffectColor::Crash);
                events.push(GameEvent::Crash { pos });
            }
        }

        if near_miss {
            run.award(SCORE_NEAR_MISS);
            run.multiplier.bump();
            run.add_floating_text(pos, "NEAR MISS!", EffectColor::NearMiss);
            run.add_particles(pos, EffectColor::NearMiss);
            events.push(GameEvent::NearMiss { pos });
        }

        if offscreen {
            run.obstacles.mark_removed(index);
        }
    }
}

fn update_pickups(run: &mut RunState, dt: f32, events: &mut Vec<GameEvent>) {
    let player_speed = run.player.speed;
    let player_box = run.player.bounds();

    for index in 0..run.pickups.len() {
        let Some(pickup) = run.pickups.get_mut(index) else {
            continue;
        };
        pickup.update(dt, player_speed);

        let (kind, pos) = (pickup.kind, pickup.pos);
        if player_box.overlaps(&pickup.bounds()) {
            run.pickups.mark_removed(index);
            events.push(collect_pickup(run, kind, pos));
        } else if pickup.is_offscreen() {
            run.pickups.mark_removed(index);
        }
    }
}

/// Apply a pickup's effect to the run
pub fn collect_pickup(run: &mut RunState, kind: PickupKind, pos: glam::Vec2) -> GameEvent {
    match kind {
        PickupKind::Coin => {
            let points = run.award(SCORE_COIN);
            run.multiplier.bump();
            run.add_floating_text(pos, format!("+{}", points.floor()), EffectColor::Coin);
        }
        PickupKind::Heal => {
            if run.player.heal() {
                run.add_floating_text(pos, "HEAL", EffectColor::Heal);
            }
        }
        PickupKind::Boost => {
            run.player.activate_boost(BOOST_DURATION_MS);
            run.award(SCORE_COIN * 2.0);
            run.multiplier.bump();
            run.add_floating_text(pos, "BOOST!", EffectColor::Boost);
        }
    }
    GameEvent::PickupCollected { kind, pos }
}
