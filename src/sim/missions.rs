//! Mission system for Missions mode
//!
//! Exactly one mission is active at a time. Completing or failing it
//! atomically advances to the next mission type and resets all progress
//! state. The cycle covers all five types, precise-avoidance included;
//! the length is the explicit constant `MISSION_CYCLE_LEN` rather than
//! something inferred from the enum at use sites.

use std::collections::HashSet;

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::state::{ItemKind, RngState, WorldEvent, WorldSnapshot};
use crate::tuning::Tuning;

/// Number of mission types in the rotation
pub const MISSION_CYCLE_LEN: usize = 5;

/// The five mission types, cycled in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionKind {
    /// Pick up N coins
    CollectCoins,
    /// Travel N meters
    Distance,
    /// Survive N seconds without crashing (a crash resets the timer)
    AvoidCrashes,
    /// Use N powerups
    UsePowerups,
    /// Pass a fixed number of obstacles cleanly, with at most 2 strikes
    AvoidObstaclesPrecise,
}

impl MissionKind {
    pub const ALL: [MissionKind; MISSION_CYCLE_LEN] = [
        MissionKind::CollectCoins,
        MissionKind::Distance,
        MissionKind::AvoidCrashes,
        MissionKind::UsePowerups,
        MissionKind::AvoidObstaclesPrecise,
    ];

    /// Next type in the rotation, wrapping after the last
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&k| k == self).unwrap();
        Self::ALL[(idx + 1) % MISSION_CYCLE_LEN]
    }
}

/// How the previous mission ended; drained by the session once per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionOutcome {
    Completed { score_bonus: u64 },
    Failed,
}

/// Active-mission state for Missions mode
#[derive(Debug, Clone)]
pub struct MissionTracker {
    kind: MissionKind,
    target: u32,
    progress: u32,
    failures: u32,
    /// Object ids already evaluated for this mission (de-duplication)
    counted: HashSet<u32>,
    /// Distance at the moment the current mission started
    distance_baseline: f32,
    /// Most recent distance sample, used to baseline the next mission
    last_distance: f32,
    /// Accumulated crash-free seconds (AvoidCrashes only)
    survival_secs: f32,
    outcome: Option<MissionOutcome>,
    tuning: Tuning,
    rng: Pcg32,
}

impl MissionTracker {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let mut tracker = Self {
            kind: MissionKind::CollectCoins,
            target: 0,
            progress: 0,
            failures: 0,
            counted: HashSet::new(),
            distance_baseline: 0.0,
            last_distance: 0.0,
            survival_secs: 0.0,
            outcome: None,
            tuning,
            rng: RngState::new(seed).stream(0x715A),
        };
        tracker.kind = tracker.roll_kind();
        tracker.set_mission();
        tracker
    }

    fn roll_kind(&mut self) -> MissionKind {
        MissionKind::ALL[self.rng.random_range(0..MISSION_CYCLE_LEN)]
    }

    /// Roll a fresh target for the current mission type and clear progress
    fn set_mission(&mut self) {
        let roll = |rng: &mut Pcg32, (lo, hi): (u32, u32)| rng.random_range(lo..=hi);
        self.target = match self.kind {
            MissionKind::CollectCoins => roll(&mut self.rng, self.tuning.coin_target),
            MissionKind::Distance => roll(&mut self.rng, self.tuning.distance_target),
            MissionKind::AvoidCrashes => roll(&mut self.rng, self.tuning.survive_target),
            MissionKind::UsePowerups => roll(&mut self.rng, self.tuning.powerup_target),
            MissionKind::AvoidObstaclesPrecise => PRECISE_AVOID_TARGET,
        };
        self.progress = 0;
        self.failures = 0;
        self.survival_secs = 0.0;
        self.distance_baseline = self.last_distance;
        self.counted.clear();
        log::info!("new mission: {}", self.description());
    }

    /// Pin the tracker to a specific mission type (scripted runs, tests)
    pub fn force_mission(&mut self, kind: MissionKind) {
        self.kind = kind;
        self.set_mission();
        self.outcome = None;
    }

    /// Per-frame sampling of passive missions.
    ///
    /// Must run after the frame's collision/pickup events were delivered so
    /// progress reflects exactly one frame's worth of world changes.
    pub fn tick(&mut self, snap: &WorldSnapshot, dt: f32) {
        debug_assert!(dt >= 0.0, "negative frame delta");
        self.last_distance = snap.distance;

        match self.kind {
            MissionKind::Distance => {
                self.progress = (snap.distance - self.distance_baseline).max(0.0) as u32;
            }
            MissionKind::AvoidCrashes => {
                self.survival_secs += dt;
                self.progress = self.survival_secs as u32;
            }
            _ => {}
        }
        self.check_complete();
    }

    /// Feed one world event. Each object id contributes at most once.
    pub fn update_progress(&mut self, event: &WorldEvent) {
        match (self.kind, *event) {
            (
                MissionKind::CollectCoins,
                WorldEvent::ItemCollected {
                    id,
                    kind: ItemKind::Coin,
                },
            ) => self.credit(id),
            (
                MissionKind::UsePowerups,
                WorldEvent::ItemCollected {
                    id,
                    kind: ItemKind::Powerup,
                },
            ) => self.credit(id),
            (MissionKind::AvoidObstaclesPrecise, WorldEvent::ObstaclePassed { id }) => {
                self.credit(id)
            }
            (MissionKind::AvoidObstaclesPrecise, WorldEvent::ObstacleHit { id }) => {
                if self.counted.insert(id) {
                    self.failures += 1;
                    if self.failures > PRECISE_AVOID_MAX_FAILURES {
                        self.fail();
                    }
                }
            }
            (MissionKind::AvoidCrashes, WorldEvent::ObstacleHit { .. }) => {
                // The whole point of the mission: a crash restarts the clock
                self.survival_secs = 0.0;
                self.progress = 0;
            }
            _ => {}
        }
    }

    fn credit(&mut self, id: u32) {
        if self.counted.insert(id) {
            self.progress += 1;
            self.check_complete();
        }
    }

    fn check_complete(&mut self) {
        if self.progress >= self.target {
            log::info!("mission complete: {}", self.description());
            self.outcome = Some(MissionOutcome::Completed {
                score_bonus: MISSION_SCORE_BONUS,
            });
            self.kind = self.kind.next();
            self.set_mission();
        }
    }

    fn fail(&mut self) {
        log::info!("mission failed: {}", self.description());
        self.outcome = Some(MissionOutcome::Failed);
        self.kind = self.kind.next();
        self.set_mission();
    }

    /// Human-readable mission line for the HUD
    pub fn description(&self) -> String {
        match self.kind {
            MissionKind::CollectCoins => {
                format!("Collect {} coins ({}/{})", self.target, self.progress, self.target)
            }
            MissionKind::Distance => {
                format!("Travel {}m ({}/{})", self.target, self.progress, self.target)
            }
            MissionKind::AvoidCrashes => format!(
                "Survive {}s without crashing ({}/{})",
                self.target, self.progress, self.target
            ),
            MissionKind::UsePowerups => {
                format!("Use {} powerups ({}/{})", self.target, self.progress, self.target)
            }
            MissionKind::AvoidObstaclesPrecise => format!(
                "Pass {} obstacles cleanly ({}/{}, {} strikes left)",
                self.target,
                self.progress,
                self.target,
                (PRECISE_AVOID_MAX_FAILURES + 1).saturating_sub(self.failures),
            ),
        }
    }

    /// Whether the mission that just ended this frame completed
    pub fn is_complete(&self) -> bool {
        matches!(self.outcome, Some(MissionOutcome::Completed { .. }))
    }

    /// Whether the mission that just ended this frame failed
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Some(MissionOutcome::Failed))
    }

    /// Drain the pending outcome (the session applies the score bonus)
    pub fn take_outcome(&mut self) -> Option<MissionOutcome> {
        self.outcome.take()
    }

    pub fn kind(&self) -> MissionKind {
        self.kind
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Re-roll everything for a new game
    pub fn reset(&mut self) {
        self.kind = self.roll_kind();
        self.last_distance = 0.0;
        self.set_mission();
        self.outcome = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> MissionTracker {
        MissionTracker::new(Tuning::default(), 4242)
    }

    fn snap(distance: f32) -> WorldSnapshot {
        WorldSnapshot {
            distance,
            ..Default::default()
        }
    }

    /// Drive the current mission to completion, whatever its type
    fn complete_current(t: &mut MissionTracker, next_id: &mut u32) {
        let kind = t.kind();
        let target = t.target();
        match kind {
            MissionKind::CollectCoins => {
                for _ in 0..target {
                    *next_id += 1;
                    t.update_progress(&WorldEvent::ItemCollected {
                        id: *next_id,
                        kind: ItemKind::Coin,
                    });
                }
            }
            MissionKind::Distance => {
                let base = t.last_distance;
                t.tick(&snap(base + target as f32 + 1.0), 0.0);
            }
            MissionKind::AvoidCrashes => {
                t.tick(&snap(t.last_distance), target as f32 + 1.0);
            }
            MissionKind::UsePowerups => {
                for _ in 0..target {
                    *next_id += 1;
                    t.update_progress(&WorldEvent::ItemCollected {
                        id: *next_id,
                        kind: ItemKind::Powerup,
                    });
                }
            }
            MissionKind::AvoidObstaclesPrecise => {
                for _ in 0..target {
                    *next_id += 1;
                    t.update_progress(&WorldEvent::ObstaclePassed { id: *next_id });
                }
            }
        }
        assert!(t.is_complete(), "mission {kind:?} did not complete");
        assert_ne!(t.kind(), kind, "mission type must advance on completion");
        assert_eq!(t.progress(), 0, "progress must reset on transition");
        t.take_outcome();
    }

    #[test]
    fn test_cycle_visits_all_types_and_closes() {
        let mut t = tracker();
        t.force_mission(MissionKind::CollectCoins);
        let mut next_id = 0;
        let mut visited = Vec::new();
        for _ in 0..MISSION_CYCLE_LEN {
            visited.push(t.kind());
            complete_current(&mut t, &mut next_id);
        }
        assert_eq!(t.kind(), MissionKind::CollectCoins);
        for kind in MissionKind::ALL {
            assert!(visited.contains(&kind), "{kind:?} never visited");
        }
    }

    #[test]
    fn test_duplicate_ids_count_once() {
        let mut t = tracker();
        t.force_mission(MissionKind::CollectCoins);
        let event = WorldEvent::ItemCollected {
            id: 7,
            kind: ItemKind::Coin,
        };
        t.update_progress(&event);
        t.update_progress(&event);
        assert_eq!(t.progress(), 1);
    }

    #[test]
    fn test_precise_fails_on_third_hit_not_second() {
        let mut t = tracker();
        t.force_mission(MissionKind::AvoidObstaclesPrecise);
        assert_eq!(t.target(), PRECISE_AVOID_TARGET);

        t.update_progress(&WorldEvent::ObstacleHit { id: 1 });
        t.update_progress(&WorldEvent::ObstacleHit { id: 2 });
        assert!(!t.is_failed());
        assert_eq!(t.failures(), 2);

        t.update_progress(&WorldEvent::ObstacleHit { id: 3 });
        assert!(t.is_failed());
        assert!(!t.is_complete());
        // Transition already happened: new mission, clean slate
        assert_ne!(t.kind(), MissionKind::AvoidObstaclesPrecise);
        assert_eq!(t.failures(), 0);
    }

    #[test]
    fn test_precise_repeat_hit_on_same_obstacle_is_one_strike() {
        let mut t = tracker();
        t.force_mission(MissionKind::AvoidObstaclesPrecise);
        for _ in 0..5 {
            t.update_progress(&WorldEvent::ObstacleHit { id: 11 });
        }
        assert_eq!(t.failures(), 1);
        assert!(!t.is_failed());
    }

    #[test]
    fn test_crash_resets_survival_timer() {
        let mut t = tracker();
        t.force_mission(MissionKind::AvoidCrashes);
        t.tick(&snap(0.0), 10.0);
        assert_eq!(t.progress(), 10);

        t.update_progress(&WorldEvent::ObstacleHit { id: 1 });
        assert_eq!(t.progress(), 0);
    }

    #[test]
    fn test_distance_mission_measures_from_mission_start() {
        let mut t = tracker();
        // Establish a distance sample, then start the mission from there
        t.tick(&snap(500.0), 0.0);
        t.force_mission(MissionKind::Distance);
        let target = t.target();

        t.tick(&snap(500.0 + target as f32 / 2.0), 1.0);
        assert!(!t.is_complete());
        t.tick(&snap(500.0 + target as f32), 1.0);
        assert!(t.is_complete());
    }

    #[test]
    fn test_completion_bonus_surfaced_once() {
        let mut t = tracker();
        t.force_mission(MissionKind::CollectCoins);
        let target = t.target();
        for id in 0..target {
            t.update_progress(&WorldEvent::ItemCollected {
                id,
                kind: ItemKind::Coin,
            });
        }
        assert_eq!(
            t.take_outcome(),
            Some(MissionOutcome::Completed {
                score_bonus: MISSION_SCORE_BONUS
            })
        );
        assert_eq!(t.take_outcome(), None);
    }

    #[test]
    fn test_target_ranges() {
        for seed in 0..30 {
            let mut t = MissionTracker::new(Tuning::default(), seed);
            t.force_mission(MissionKind::CollectCoins);
            assert!((10..=30).contains(&t.target()));
            t.force_mission(MissionKind::Distance);
            assert!((1000..=3000).contains(&t.target()));
            t.force_mission(MissionKind::AvoidCrashes);
            assert!((30..=60).contains(&t.target()));
            t.force_mission(MissionKind::UsePowerups);
            assert!((3..=8).contains(&t.target()));
        }
    }
}
