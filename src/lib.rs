//! Lane Rush - progression core for a lane-based arcade racer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (difficulty, patterns, missions, session tick)
//! - `highscores`: Mode-keyed leaderboards persisted as JSON
//! - `tuning`: Data-driven game balance
//!
//! The rendering/input shell is a separate concern and never appears here:
//! the sim consumes per-frame snapshots and inputs by value and hands back
//! events and derived parameters.

pub mod highscores;
pub mod sim;
pub mod tuning;

pub use highscores::{HighScoreEntry, HighScores};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Spawn interval floors (seconds) - difficulty never pushes below these
    pub const MIN_OBSTACLE_SPAWN_INTERVAL: f32 = 1.5;
    pub const MIN_CAR_SPAWN_INTERVAL: f32 = 2.0;
    /// Baseline spawn intervals at level 0
    pub const BASE_OBSTACLE_SPAWN_INTERVAL: f32 = 3.0;
    pub const BASE_CAR_SPAWN_INTERVAL: f32 = 4.0;

    /// Concurrent object caps at max difficulty
    pub const MAX_OBSTACLES: u32 = 6;
    pub const MAX_CARS: u32 = 5;
    /// Aggressive-AI probability ceiling
    pub const MAX_AGGRESSIVE_AI_CHANCE: f32 = 0.7;

    /// How long a "difficulty increased" notice stays visible (seconds)
    pub const NOTIFICATION_SECS: f32 = 3.0;

    /// Flat score bonus for any completed mission
    pub const MISSION_SCORE_BONUS: u64 = 100;
    /// Precise-avoidance mission: fixed target and failure allowance
    pub const PRECISE_AVOID_TARGET: u32 = 25;
    pub const PRECISE_AVOID_MAX_FAILURES: u32 = 2;

    /// Time-attack clock bonus per completed mission (seconds)
    pub const TIME_ATTACK_BONUS_SECS: f32 = 5.0;
    /// MaintainSpeed mission threshold (world speed units, km/h-equivalent)
    pub const MAINTAIN_SPEED_THRESHOLD: f32 = 200.0;
    /// Speed multiplier while a boost powerup is active
    pub const BOOST_MULTIPLIER: f32 = 1.5;
    /// Boost powerup duration (seconds)
    pub const BOOST_SECS: f32 = 3.0;

    /// Player car footprint (world units)
    pub const CAR_WIDTH: f32 = 40.0;
    pub const CAR_HEIGHT: f32 = 70.0;
    /// Obstacle footprint
    pub const OBSTACLE_WIDTH: f32 = 44.0;
    pub const OBSTACLE_HEIGHT: f32 = 44.0;
    /// Collectible footprint
    pub const COLLECTIBLE_SIZE: f32 = 24.0;

    /// Base forward speed at the start of a run
    pub const BASE_SPEED: f32 = 120.0;
    /// Hard ceiling on forward speed
    pub const MAX_SPEED: f32 = 320.0;
    /// World distance (meters) gained per speed unit per second
    pub const DISTANCE_SCALE: f32 = 0.28;

    /// Score awards fed back to the loop
    pub const OBSTACLE_PASS_SCORE: u64 = 10;
    pub const CAR_PASS_SCORE: u64 = 20;
    pub const COIN_SCORE: u64 = 5;

    /// Starting lives (a crash costs one)
    pub const START_LIVES: u8 = 3;
}

/// Linear interpolation between two balance endpoints
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}
