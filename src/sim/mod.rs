//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies
//!
//! Within one frame the session guarantees: difficulty updates before the
//! spawner reads its settings, and mission progress updates after
//! collision/pickup resolution.

pub mod difficulty;
pub mod lane;
pub mod missions;
pub mod pattern;
pub mod state;
pub mod tick;
pub mod time_attack;

pub use difficulty::{DifficultyManager, DifficultySettings};
pub use lane::{Aabb, ViewportConfig};
pub use missions::{MISSION_CYCLE_LEN, MissionKind, MissionOutcome, MissionTracker};
pub use pattern::Archetype;
pub use state::{
    Collectible, GameMode, GamePhase, ItemKind, Obstacle, RngState, TrafficCar, WorldEvent,
    WorldSnapshot,
};
pub use tick::{GameState, TickInput, tick};
pub use time_attack::{
    TIME_ATTACK_MISSION_COUNT, TimeAttackMission, TimeAttackOutcome, TimeAttackTracker,
};
