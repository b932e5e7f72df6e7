//! Time-attack mode: countdown clock plus its own mission system
//!
//! The clock is the difficulty driver here - a `difficulty_factor` derived
//! from elapsed fraction of the initial time scales spawn rate and speed
//! ramp. This is deliberately a separate mechanism from `DifficultyManager`
//! (different driver: countdown urgency vs cumulative progress) and the two
//! are never unified.
//!
//! Unlike the Missions-mode tracker, a completed mission re-rolls uniformly
//! at random from all six types instead of cycling.

use std::collections::HashSet;

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::state::{RngState, WorldEvent, WorldSnapshot};
use crate::tuning::Tuning;

/// Number of time-attack mission types
pub const TIME_ATTACK_MISSION_COUNT: usize = 6;

/// Time-attack mission types, drawn uniformly on each re-roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeAttackMission {
    /// Stay alive for N seconds
    Survive,
    /// Cleanly pass N obstacles
    AvoidObstacles,
    /// Hold the speed threshold for N *contiguous* seconds
    MaintainSpeed,
    /// Pick up N collectibles of any kind
    CollectItems,
    /// Overtake N traffic cars
    PassCars,
    /// Push the live score past a rolled target
    ReachScore,
}

impl TimeAttackMission {
    pub const ALL: [TimeAttackMission; TIME_ATTACK_MISSION_COUNT] = [
        TimeAttackMission::Survive,
        TimeAttackMission::AvoidObstacles,
        TimeAttackMission::MaintainSpeed,
        TimeAttackMission::CollectItems,
        TimeAttackMission::PassCars,
        TimeAttackMission::ReachScore,
    ];
}

/// Rewards for a completed time-attack mission
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAttackOutcome {
    pub time_bonus: f32,
    pub score_bonus: u64,
}

/// Countdown run state plus the active mission
#[derive(Debug, Clone)]
pub struct TimeAttackTracker {
    mission: TimeAttackMission,
    /// Seconds or counts depending on the mission type
    target: u32,
    /// Absolute score target (ReachScore only)
    target_score: u64,
    progress_count: u32,
    progress_secs: f32,
    /// Contiguous above-threshold seconds (MaintainSpeed only)
    maintain_secs: f32,
    counted: HashSet<u32>,
    time_remaining: f32,
    initial_time: f32,
    difficulty_factor: f32,
    last_score: u64,
    outcome: Option<TimeAttackOutcome>,
    game_over: bool,
    tuning: Tuning,
    rng: Pcg32,
}

impl TimeAttackTracker {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let initial = tuning.time_attack.initial_secs;
        let mut tracker = Self {
            mission: TimeAttackMission::Survive,
            target: 0,
            target_score: 0,
            progress_count: 0,
            progress_secs: 0.0,
            maintain_secs: 0.0,
            counted: HashSet::new(),
            time_remaining: initial,
            initial_time: initial,
            difficulty_factor: 1.0,
            last_score: 0,
            outcome: None,
            game_over: false,
            tuning,
            rng: RngState::new(seed).stream(0x71AC),
        };
        tracker.roll_mission();
        tracker
    }

    /// Uniform draw over all six types, then roll its target
    fn roll_mission(&mut self) {
        self.mission = TimeAttackMission::ALL[self.rng.random_range(0..TIME_ATTACK_MISSION_COUNT)];
        self.set_target();
    }

    fn set_target(&mut self) {
        let ta = &self.tuning.time_attack;
        let roll = |rng: &mut Pcg32, (lo, hi): (u32, u32)| rng.random_range(lo..=hi);
        self.target = match self.mission {
            TimeAttackMission::Survive => roll(&mut self.rng, ta.survive_target),
            TimeAttackMission::AvoidObstacles => roll(&mut self.rng, ta.avoid_target),
            TimeAttackMission::MaintainSpeed => roll(&mut self.rng, ta.maintain_target),
            TimeAttackMission::CollectItems => roll(&mut self.rng, ta.collect_target),
            TimeAttackMission::PassCars => roll(&mut self.rng, ta.pass_target),
            TimeAttackMission::ReachScore => {
                let delta = roll(&mut self.rng, ta.score_delta);
                self.target_score = self.last_score + delta as u64;
                delta
            }
        };
        self.progress_count = 0;
        self.progress_secs = 0.0;
        self.maintain_secs = 0.0;
        self.counted.clear();
        log::info!("time-attack mission: {}", self.mission_text());
    }

    /// Pin the tracker to a specific mission and target (scripted runs, tests)
    pub fn force_mission(&mut self, mission: TimeAttackMission, target: u32) {
        self.mission = mission;
        self.target = target;
        if mission == TimeAttackMission::ReachScore {
            self.target_score = self.last_score + target as u64;
        }
        self.progress_count = 0;
        self.progress_secs = 0.0;
        self.maintain_secs = 0.0;
        self.counted.clear();
        self.outcome = None;
    }

    /// Per-frame update: countdown, difficulty factor, passive missions.
    ///
    /// Reaching zero on the clock ends the whole run - this is a hard
    /// game-over, not a mission failure.
    pub fn update(&mut self, snap: &WorldSnapshot, dt: f32) {
        debug_assert!(dt >= 0.0, "negative frame delta");
        if self.game_over {
            return;
        }
        self.last_score = snap.score;

        self.time_remaining -= dt;
        if self.time_remaining <= 0.0 {
            self.time_remaining = 0.0;
            self.game_over = true;
            log::info!("time attack over: clock expired at score {}", snap.score);
            return;
        }

        // The clock itself drives difficulty in this mode
        self.difficulty_factor =
            1.0 + ((self.initial_time - self.time_remaining) / self.initial_time).max(0.0);

        match self.mission {
            TimeAttackMission::Survive => {
                self.progress_secs += dt;
                if self.progress_secs >= self.target as f32 {
                    self.complete();
                }
            }
            TimeAttackMission::MaintainSpeed => {
                if snap.effective_speed() >= MAINTAIN_SPEED_THRESHOLD {
                    self.maintain_secs += dt;
                    if self.maintain_secs >= self.target as f32 {
                        self.complete();
                    }
                } else {
                    // Strict contiguity: one slow tick forfeits everything
                    self.maintain_secs = 0.0;
                }
            }
            TimeAttackMission::ReachScore => {
                if snap.score >= self.target_score {
                    self.complete();
                }
            }
            _ => {}
        }
    }

    /// Feed one world event. Each object id contributes at most once.
    pub fn on_event(&mut self, event: &WorldEvent) {
        if self.game_over {
            return;
        }
        match (self.mission, *event) {
            (TimeAttackMission::AvoidObstacles, WorldEvent::ObstaclePassed { id }) => {
                self.credit(id)
            }
            (TimeAttackMission::PassCars, WorldEvent::CarPassed { id }) => self.credit(id),
            (TimeAttackMission::CollectItems, WorldEvent::ItemCollected { id, .. }) => {
                self.credit(id)
            }
            _ => {}
        }
    }

    fn credit(&mut self, id: u32) {
        if self.counted.insert(id) {
            self.progress_count += 1;
            if self.progress_count >= self.target {
                self.complete();
            }
        }
    }

    fn complete(&mut self) {
        log::info!("time-attack mission complete: {}", self.mission_text());
        self.time_remaining += TIME_ATTACK_BONUS_SECS;
        self.outcome = Some(TimeAttackOutcome {
            time_bonus: TIME_ATTACK_BONUS_SECS,
            score_bonus: MISSION_SCORE_BONUS,
        });
        self.roll_mission();
    }

    /// Human-readable mission line for the HUD
    pub fn mission_text(&self) -> String {
        match self.mission {
            TimeAttackMission::Survive => format!(
                "Survive {}s ({:.0}/{})",
                self.target, self.progress_secs, self.target
            ),
            TimeAttackMission::AvoidObstacles => format!(
                "Avoid {} obstacles ({}/{})",
                self.target, self.progress_count, self.target
            ),
            TimeAttackMission::MaintainSpeed => format!(
                "Hold {} km/h for {}s ({:.1}s)",
                MAINTAIN_SPEED_THRESHOLD as u32, self.target, self.maintain_secs
            ),
            TimeAttackMission::CollectItems => format!(
                "Collect {} items ({}/{})",
                self.target, self.progress_count, self.target
            ),
            TimeAttackMission::PassCars => format!(
                "Pass {} cars ({}/{})",
                self.target, self.progress_count, self.target
            ),
            TimeAttackMission::ReachScore => format!("Reach {} points", self.target_score),
        }
    }

    pub fn time_remaining(&self) -> f32 {
        self.time_remaining
    }

    /// 1.0 at the start, approaching 2.0 as the initial clock runs dry
    pub fn difficulty_factor(&self) -> f32 {
        self.difficulty_factor
    }

    /// Spawn interval under clock pressure (faster spawns late in the run)
    pub fn scaled_spawn_interval(&self, base: f32) -> f32 {
        base / self.difficulty_factor
    }

    /// Speed ramp under clock pressure
    pub fn scaled_speed_increment(&self, base: f32) -> f32 {
        base * self.difficulty_factor
    }

    /// Hard game-over flag (clock expired)
    pub fn is_over(&self) -> bool {
        self.game_over
    }

    pub fn mission(&self) -> TimeAttackMission {
        self.mission
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    /// Drain the pending completion rewards
    pub fn take_outcome(&mut self) -> Option<TimeAttackOutcome> {
        self.outcome.take()
    }

    /// Fresh clock and mission for a new run
    pub fn reset(&mut self) {
        self.time_remaining = self.initial_time;
        self.difficulty_factor = 1.0;
        self.last_score = 0;
        self.game_over = false;
        self.outcome = None;
        self.roll_mission();
    }
}
