//! Run state and core simulation types
//!
//! A `RunState` lives from `start_run` until the next run (or until the
//! player leaves to the title screen). It owns every entity on the road.

use glam::Vec2;

use super::arena::EntityList;
use super::entity::{
    EffectColor, FloatingText, Obstacle, ObstacleKind, Particle, Pickup, PickupKind, Player,
};
use super::rng::GameRng;
use super::scoring::Multiplier;
use super::spawn::SpawnScheduler;
use crate::settings::Difficulty;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEndCause {
    Crash,
}

impl RunEndCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunEndCause::Crash => "crash",
        }
    }
}

/// Something that happened during a tick that the outside world may react to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Non-fatal hit that started an invulnerability window
    Crash { pos: Vec2 },
    NearMiss { pos: Vec2 },
    PickupCollected { kind: PickupKind, pos: Vec2 },
    /// The player's health ran out
    RunEnded { cause: RunEndCause },
}

/// Complete state of one play session
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub difficulty: Difficulty,
    /// Accumulated score (>= 0)
    pub score: f64,
    /// Distance travelled; never decreases while playing
    pub distance: f64,
    pub multiplier: Multiplier,
    pub spawner: SpawnScheduler,
    pub player: Player,
    pub obstacles: EntityList<Obstacle>,
    pub pickups: EntityList<Pickup>,
    /// Cosmetic only
    pub particles: Vec<Particle>,
    pub floating_texts: Vec<FloatingText>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Set when the run is over
    pub ended: Option<RunEndCause>,
    /// Random source for cosmetic effects, kept apart from the gameplay stream
    pub fx_rng: GameRng,
    next_id: u32,
}

impl RunState {
    /// Fresh run for `difficulty`; `fx_seed` drives particle scatter
    pub fn new(difficulty: Difficulty, fx_seed: u64) -> Self {
        Self {
            difficulty,
            score: 0.0,
            distance: 0.0,
            multiplier: Multiplier::new(difficulty.multiplier_ceiling()),
            spawner: SpawnScheduler::default(),
            player: Player::new(difficulty.starting_health()),
            obstacles: EntityList::new(),
            pickups: EntityList::new(),
            particles: Vec::new(),
            floating_texts: Vec::new(),
            time_ticks: 0,
            ended: None,
            fx_rng: GameRng::new(fx_seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_over(&self) -> bool {
        self.ended.is_some()
    }

    pub fn spawn_obstacle(&mut self, lane: usize, kind: ObstacleKind) -> u32 {
        let id = self.next_entity_id();
        self.obstacles.push(Obstacle::new(id, lane, kind));
        id
    }

    pub fn spawn_pickup(&mut self, lane: usize, kind: PickupKind) -> u32 {
        let id = self.next_entity_id();
        self.pickups.push(Pickup::new(id, lane, kind));
        id
    }

    /// Add points scaled by the current multiplier
    pub fn award(&mut self, base: f32) -> f32 {
        let points = base * self.multiplier.value();
        self.score += points as f64;
        points
    }

    pub fn add_particles(&mut self, pos: Vec2, color: EffectColor) {
        let burst = Particle::burst(pos, color, &mut self.fx_rng);
        self.particles.extend(burst);
    }

    pub fn add_floating_text(&mut self, pos: Vec2, text: impl Into<String>, color: EffectColor) {
        self.floating_texts.push(FloatingText::new(pos, text, color));
    }

    /// Age particles and popups, dropping expired ones
    pub fn age_effects(&mut self, dt: f32) {
        for particle in &mut self.particles {
            particle.update(dt);
        }
        self.particles.retain(|p| !p.is_dead());

        for text in &mut self.floating_texts {
            text.update(dt);
        }
        self.floating_texts.retain(|t| !t.is_dead());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_run_by_difficulty() {
        let easy = RunState::new(Difficulty::Easy, 1);
        assert_eq!(easy.player.health, 5);
        assert_eq!(easy.player.max_health, 5);

        let hard = RunState::new(Difficulty::Hard, 1);
        assert_eq!(hard.player.health, 2);
        assert_eq!(hard.multiplier.ceiling(), 15.0);

        let normal = RunState::new(Difficulty::Normal, 1);
        assert_eq!(normal.player.health, 3);
        assert_eq!(normal.multiplier.value(), 1.0);
        assert!(!normal.is_over());
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut run = RunState::new(Difficulty::Normal, 1);
        let a = run.spawn_obstacle(0, ObstacleKind::Plain);
        let b = run.spawn_pickup(1, PickupKind::Coin);
        let c = run.spawn_obstacle(2, ObstacleKind::Slow);
        assert!(a < b && b < c);
        assert_eq!(run.obstacles.len(), 2);
        assert_eq!(run.pickups.len(), 1);
    }

    #[test]
    fn test_award_uses_multiplier() {
        let mut run = RunState::new(Difficulty::Normal, 1);
        run.multiplier.set(2.0);
        assert_eq!(run.award(100.0), 200.0);
        assert_eq!(run.score, 200.0);
    }

    #[test]
    fn test_effects_age_out() {
        let mut run = RunState::new(Difficulty::Normal, 1);
        run.add_particles(Vec2::new(10.0, 10.0), EffectColor::NearMiss);
        run.add_floating_text(Vec2::ZERO, "HEAL", EffectColor::Heal);
        assert_eq!(run.particles.len(), 10);
        for _ in 0..100 {
            run.age_effects(crate::consts::FIXED_DT_MS);
        }
        assert!(run.particles.is_empty());
        assert!(run.floating_texts.is_empty());
    }
}
