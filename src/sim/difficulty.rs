//! Difficulty level computation and derived spawn parameters
//!
//! The level is the maximum of three independent threshold-crossing counts
//! (distance, elapsed time, score) and never regresses within a session.
//! Every derived parameter is a pure function of `level / max_level`, so
//! the whole parameter set can be regenerated from the level alone.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::lerp;
use crate::sim::pattern;
use crate::sim::state::RngState;
use crate::tuning::Tuning;

/// Derived parameter set, recomputed on each level change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultySettings {
    /// Seconds between obstacle spawn events (floored at 1.5)
    pub obstacle_spawn_interval: f32,
    /// Seconds between traffic car spawns (floored at 2.0)
    pub car_spawn_interval: f32,
    /// Concurrent obstacle cap (at most 6)
    pub max_obstacles: u32,
    /// Concurrent traffic car cap (at most 5)
    pub max_cars: u32,
    /// Scroll speed multiplier applied to obstacles, >= 1.0
    pub obstacle_speed_multiplier: f32,
    /// Pattern archetype tier, 0..=3
    pub pattern_complexity: u8,
    /// Probability that a freshly spawned car is aggressive, <= 0.7
    pub aggressive_ai_chance: f32,
    /// Per-frame base speed increase
    pub speed_increment: f32,
}

impl DifficultySettings {
    /// Pure function of the level ratio; see the field docs for the bounds.
    pub fn for_level(level: u32, max_level: u32) -> Self {
        debug_assert!(max_level > 0 && level <= max_level);
        let t = level as f32 / max_level as f32;

        Self {
            obstacle_spawn_interval: lerp(
                BASE_OBSTACLE_SPAWN_INTERVAL,
                MIN_OBSTACLE_SPAWN_INTERVAL,
                t,
            )
            .max(MIN_OBSTACLE_SPAWN_INTERVAL),
            car_spawn_interval: lerp(BASE_CAR_SPAWN_INTERVAL, MIN_CAR_SPAWN_INTERVAL, t)
                .max(MIN_CAR_SPAWN_INTERVAL),
            max_obstacles: (2 + (t * 4.0).round() as u32).min(MAX_OBSTACLES),
            max_cars: (1 + (t * 4.0).round() as u32).min(MAX_CARS),
            obstacle_speed_multiplier: 1.0 + 0.8 * t,
            pattern_complexity: ((3 * level) / max_level).min(3) as u8,
            aggressive_ai_chance: (MAX_AGGRESSIVE_AI_CHANCE * t).min(MAX_AGGRESSIVE_AI_CHANCE),
            speed_increment: lerp(0.02, 0.08, t),
        }
    }
}

/// One-shot "difficulty increased" notice, visible for a fixed duration
#[derive(Debug, Clone)]
struct Notification {
    text: String,
    age: f32,
}

/// Tracks the session's difficulty level and hands out derived parameters
#[derive(Debug, Clone)]
pub struct DifficultyManager {
    tuning: Tuning,
    current_level: u32,
    elapsed: f32,
    settings: DifficultySettings,
    notification: Option<Notification>,
    rng: Pcg32,
}

impl DifficultyManager {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        tuning.validate();
        let settings = DifficultySettings::for_level(0, tuning.max_level);
        Self {
            tuning,
            current_level: 0,
            elapsed: 0.0,
            settings,
            notification: None,
            rng: RngState::new(seed).stream(0xD1FF),
        }
    }

    /// Per-frame update with the cumulative world state.
    ///
    /// Must run before the spawner reads the derived settings for the same
    /// frame. `dt` is the frame delta in seconds; negative values are a
    /// contract violation.
    pub fn update(&mut self, distance: f32, score: u64, dt: f32) {
        debug_assert!(dt >= 0.0, "negative frame delta");
        self.elapsed += dt;

        if let Some(n) = &mut self.notification {
            n.age += dt;
            if n.age >= NOTIFICATION_SECS {
                self.notification = None;
            }
        }

        let level = self.compute_level(distance, score);
        if level > self.current_level {
            self.current_level = level;
            self.settings = DifficultySettings::for_level(level, self.tuning.max_level);
            log::info!(
                "difficulty level {} (distance {:.0}m, score {}, {:.0}s elapsed)",
                level,
                distance,
                score,
                self.elapsed
            );
            self.notification = Some(Notification {
                text: format!("Difficulty up! Level {level}"),
                age: 0.0,
            });
        }
    }

    /// Max of the three independent threshold-crossing counts
    fn compute_level(&self, distance: f32, score: u64) -> u32 {
        let crossed_f = |table: &[f32], value: f32| table.iter().filter(|&&t| value >= t).count();
        let by_distance = crossed_f(&self.tuning.distance_thresholds, distance);
        let by_time = crossed_f(&self.tuning.time_thresholds, self.elapsed);
        let by_score = self
            .tuning
            .score_thresholds
            .iter()
            .filter(|&&t| score >= t)
            .count();

        (by_distance.max(by_time).max(by_score) as u32).min(self.tuning.max_level)
    }

    /// Expand one spawn event into concrete lane indices.
    ///
    /// `lane_count` must be at least 2 (asserted in debug builds).
    pub fn get_obstacle_pattern(&mut self, lane_count: usize) -> Vec<usize> {
        debug_assert!(lane_count >= 2, "lane_count must be at least 2");
        pattern::generate(&mut self.rng, self.settings.pattern_complexity, lane_count)
    }

    /// Bernoulli draw at the current aggressive-AI chance
    pub fn should_spawn_aggressive_ai(&mut self) -> bool {
        self.rng
            .random_bool(self.settings.aggressive_ai_chance as f64)
    }

    /// Active notice text, if one is still within its display window
    pub fn get_notification(&self) -> Option<&str> {
        self.notification.as_ref().map(|n| n.text.as_str())
    }

    pub fn get_spawn_intervals(&self) -> (f32, f32) {
        (
            self.settings.obstacle_spawn_interval,
            self.settings.car_spawn_interval,
        )
    }

    pub fn get_max_objects(&self) -> (u32, u32) {
        (self.settings.max_obstacles, self.settings.max_cars)
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    pub fn settings(&self) -> &DifficultySettings {
        &self.settings
    }

    /// Back to level 0 for a new game
    pub fn reset(&mut self) {
        self.current_level = 0;
        self.elapsed = 0.0;
        self.settings = DifficultySettings::for_level(0, self.tuning.max_level);
        self.notification = None;
    }
}
