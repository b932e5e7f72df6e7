//! High score leaderboard system
//!
//! A single JSON document keyed by game mode, each mode holding the top 10
//! runs sorted descending by score. The sim never touches this directly;
//! the shell calls `record_if_high` once when a run ends.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::state::GameMode;

/// Maximum number of high scores kept per mode
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's name
    pub name: String,
    pub score: u64,
    /// Distance reached (meters)
    pub distance: u32,
    /// Coins banked during the run
    pub coins: u32,
    /// "YYYY-MM-DD HH:MM"
    pub date: String,
}

/// Per-mode leaderboards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighScores {
    #[serde(default)]
    pub endless: Vec<HighScoreEntry>,
    #[serde(default)]
    pub time_attack: Vec<HighScoreEntry>,
    #[serde(default)]
    pub missions: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, mode: GameMode) -> &[HighScoreEntry] {
        match mode {
            GameMode::Endless => &self.endless,
            GameMode::TimeAttack => &self.time_attack,
            GameMode::Missions => &self.missions,
        }
    }

    fn table_mut(&mut self, mode: GameMode) -> &mut Vec<HighScoreEntry> {
        match mode {
            GameMode::Endless => &mut self.endless,
            GameMode::TimeAttack => &mut self.time_attack,
            GameMode::Missions => &mut self.missions,
        }
    }

    /// Check if a score qualifies for a mode's leaderboard
    pub fn qualifies(&self, mode: GameMode, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        let table = self.table(mode);
        if table.len() < MAX_HIGH_SCORES {
            return true;
        }
        table.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Insert the entry if it qualifies, keeping the table sorted and capped.
    /// Returns whether the run made the board.
    pub fn record_if_high(&mut self, mode: GameMode, entry: HighScoreEntry) -> bool {
        if !self.qualifies(mode, entry.score) {
            return false;
        }
        let score = entry.score;
        let table = self.table_mut(mode);
        let pos = table
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(table.len());
        table.insert(pos, entry);
        table.truncate(MAX_HIGH_SCORES);
        log::info!("new {} high score: {}", mode.as_str(), score);
        true
    }

    /// Best score for a mode (if any)
    pub fn top_score(&self, mode: GameMode) -> Option<u64> {
        self.table(mode).first().map(|e| e.score)
    }

    /// Load from disk; any read or parse failure yields the empty default
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(scores) => scores,
                Err(err) => {
                    log::warn!(
                        "corrupt high score file {}: {err}; starting fresh",
                        path.display()
                    );
                    Self::new()
                }
            },
            Err(_) => Self::new(),
        }
    }

    /// Write the full document as pretty JSON
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Format seconds since the Unix epoch as "YYYY-MM-DD HH:MM" (UTC)
pub fn format_date(secs_since_epoch: u64) -> String {
    let days = (secs_since_epoch / 86_400) as i64;
    let rem = secs_since_epoch % 86_400;
    let (hour, minute) = (rem / 3_600, (rem % 3_600) / 60);

    // Civil-from-days conversion over the proleptic Gregorian calendar
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);

    format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}")
}
