//! Core simulation types: modes, phases, world entities, events
//!
//! Entities are plain tagged structs with explicit bookkeeping booleans
//! (`hit` / `passed` / `collected`) so a progress tracker can never be fed
//! the same object twice by accident. The sim never hands out live entity
//! references across the tracker boundary - events carry ids by value.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::lane::Aabb;

/// Which game mode a session is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    Endless,
    TimeAttack,
    Missions,
}

impl GameMode {
    /// Key used in the high-score file
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Endless => "endless",
            GameMode::TimeAttack => "time_attack",
            GameMode::Missions => "missions",
        }
    }
}

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Frozen mid-run
    Paused,
    /// Run ended (out of lives, or time-attack clock expired)
    GameOver,
}

/// Read-only world state handed to the trackers each frame
///
/// The session is the sole writer of these values; trackers only ever see
/// this snapshot (no shared mutable globals).
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldSnapshot {
    /// Cumulative distance traveled (meters)
    pub distance: f32,
    /// Live score
    pub score: u64,
    /// Instantaneous forward speed (before boost multiplier)
    pub speed: f32,
    /// Whether a boost powerup is currently active
    pub boosting: bool,
}

impl WorldSnapshot {
    /// Speed with the boost multiplier applied
    #[inline]
    pub fn effective_speed(&self) -> f32 {
        if self.boosting {
            self.speed * BOOST_MULTIPLIER
        } else {
            self.speed
        }
    }
}

/// Collectible flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Coin,
    Powerup,
}

/// World events delivered to the trackers, at most once per object lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    /// Player cleared an obstacle without touching it
    ObstaclePassed { id: u32 },
    /// Player collided with an obstacle
    ObstacleHit { id: u32 },
    /// Player overtook a traffic car
    CarPassed { id: u32 },
    /// Player picked up a collectible
    ItemCollected { id: u32, kind: ItemKind },
}

/// A static road obstacle occupying one lane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub lane: usize,
    pub pos: Vec2,
    /// Set once on collision; a hit obstacle can no longer be "passed"
    pub hit: bool,
    /// Set once the pass has been credited
    pub passed: bool,
}

impl Obstacle {
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.pos, OBSTACLE_WIDTH, OBSTACLE_HEIGHT)
    }
}

/// An AI traffic car; aggressive ones drift toward the player's lane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficCar {
    pub id: u32,
    pub lane: usize,
    pub pos: Vec2,
    /// Own forward speed, subtracted from scroll speed
    pub speed: f32,
    pub aggressive: bool,
    pub hit: bool,
    pub passed: bool,
}

impl TrafficCar {
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.pos, CAR_WIDTH, CAR_HEIGHT)
    }
}

/// A coin or powerup sitting in a lane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub lane: usize,
    pub pos: Vec2,
    pub kind: ItemKind,
    /// One-time consumption flag
    pub collected: bool,
}

impl Collectible {
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.pos, COLLECTIBLE_SIZE, COLLECTIBLE_SIZE)
    }
}

/// RNG seed wrapper so a session can be rebuilt reproducibly
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }

    /// Derive an independent stream for a subsystem
    pub fn stream(&self, salt: u64) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ salt)
    }
}
