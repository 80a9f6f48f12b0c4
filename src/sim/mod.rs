//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (cosmetic effects use their own seeded stream)
//! - Stable iteration order (insertion order, removal deferred to end of tick)
//! - No rendering, audio or platform dependencies

pub mod arena;
pub mod collision;
pub mod entity;
pub mod rng;
pub mod scoring;
pub mod spawn;
pub mod state;
pub mod tick;

pub use arena::EntityList;
pub use collision::{Aabb, is_near_miss};
pub use entity::{
    EffectColor, FloatingText, Obstacle, ObstacleKind, Particle, Pickup, PickupKind, Player,
};
pub use rng::GameRng;
pub use scoring::Multiplier;
pub use spawn::{SpawnDue, SpawnScheduler};
pub use state::{GameEvent, RunEndCause, RunState};
pub use tick::{TickInput, collect_pickup, tick};
