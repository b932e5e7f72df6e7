//! Data-driven game balance
//!
//! Every threshold table and target range the sim consumes lives here, so
//! balance passes never touch sim code. A JSON override file can replace
//! the compiled defaults; anything unreadable falls back to them.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Balance knobs for time-attack mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAttackTuning {
    /// Starting clock (seconds)
    pub initial_secs: f32,
    /// Target ranges (inclusive lo/hi) per mission type
    pub survive_target: (u32, u32),
    pub avoid_target: (u32, u32),
    pub maintain_target: (u32, u32),
    pub collect_target: (u32, u32),
    pub pass_target: (u32, u32),
    /// ReachScore rolls current score plus this delta
    pub score_delta: (u32, u32),
}

impl Default for TimeAttackTuning {
    fn default() -> Self {
        Self {
            initial_secs: 90.0,
            survive_target: (20, 40),
            avoid_target: (10, 25),
            maintain_target: (5, 10),
            collect_target: (5, 15),
            pass_target: (5, 15),
            score_delta: (300, 1000),
        }
    }
}

/// All balance tables for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Highest reachable difficulty level; every table below has this length
    pub max_level: u32,
    /// Distance (meters) needed to cross into each level
    pub distance_thresholds: Vec<f32>,
    /// Elapsed run time (seconds) needed to cross into each level
    pub time_thresholds: Vec<f32>,
    /// Score needed to cross into each level
    pub score_thresholds: Vec<u64>,

    /// Missions-mode target ranges (inclusive lo/hi)
    pub coin_target: (u32, u32),
    pub distance_target: (u32, u32),
    pub survive_target: (u32, u32),
    pub powerup_target: (u32, u32),

    pub time_attack: TimeAttackTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_level: 10,
            distance_thresholds: vec![
                500.0, 1000.0, 2000.0, 3500.0, 5000.0, 7000.0, 9500.0, 12500.0, 16000.0, 20000.0,
            ],
            time_thresholds: vec![
                30.0, 60.0, 100.0, 150.0, 210.0, 280.0, 360.0, 450.0, 550.0, 660.0,
            ],
            score_thresholds: vec![
                200, 500, 1000, 1800, 2800, 4200, 6000, 8200, 11000, 14500,
            ],
            coin_target: (10, 30),
            distance_target: (1000, 3000),
            survive_target: (30, 60),
            powerup_target: (3, 8),
            time_attack: TimeAttackTuning::default(),
        }
    }
}

impl Tuning {
    /// Internal consistency checks; violations are programmer errors
    pub fn validate(&self) {
        debug_assert!(self.max_level > 0);
        debug_assert_eq!(self.distance_thresholds.len(), self.max_level as usize);
        debug_assert_eq!(self.time_thresholds.len(), self.max_level as usize);
        debug_assert_eq!(self.score_thresholds.len(), self.max_level as usize);
        for (lo, hi) in [
            self.coin_target,
            self.distance_target,
            self.survive_target,
            self.powerup_target,
        ] {
            debug_assert!(lo <= hi);
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load from an override file, falling back to defaults if missing or bad
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("loaded tuning overrides from {}", path.display());
                    tuning
                }
                Err(err) => {
                    log::warn!("bad tuning file {}: {err}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}
