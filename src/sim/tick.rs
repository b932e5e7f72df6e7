//! Fixed timestep session update
//!
//! Advances one frame of a headless run. The frame order is load-bearing:
//! difficulty updates before the spawner reads its derived settings, and
//! mission progress updates after collision/pickup resolution, so each
//! tracker sees exactly one frame's worth of events - never zero, never
//! double-counted.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::sim::difficulty::DifficultyManager;
use crate::sim::lane::{Aabb, ViewportConfig};
use crate::sim::missions::{MissionOutcome, MissionTracker};
use crate::sim::state::{
    Collectible, GameMode, GamePhase, ItemKind, Obstacle, RngState, TrafficCar, WorldEvent,
    WorldSnapshot,
};
use crate::sim::time_attack::TimeAttackTracker;
use crate::tuning::Tuning;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Lane change: -1 left, +1 right, 0 stay
    pub steer: i8,
    /// Pause toggle
    pub pause: bool,
}

/// Complete headless session state
#[derive(Debug, Clone)]
pub struct GameState {
    pub mode: GameMode,
    pub phase: GamePhase,
    pub viewport: ViewportConfig,
    /// Run seed for reproducibility
    pub seed: u64,

    /// Cumulative distance traveled (meters)
    pub distance: f32,
    pub score: u64,
    pub coins: u32,
    /// Forward speed before the boost multiplier
    pub speed: f32,
    pub lives: u8,
    pub player_lane: usize,
    pub elapsed: f32,
    boost_secs: f32,

    pub obstacles: Vec<Obstacle>,
    pub cars: Vec<TrafficCar>,
    pub collectibles: Vec<Collectible>,

    pub difficulty: DifficultyManager,
    /// Present in Missions mode only
    pub missions: Option<MissionTracker>,
    /// Present in TimeAttack mode only
    pub time_attack: Option<TimeAttackTracker>,

    obstacle_spawn_timer: f32,
    car_spawn_timer: f32,
    tuning: Tuning,
    next_id: u32,
    rng: Pcg32,
}

impl GameState {
    pub fn new(mode: GameMode, seed: u64) -> Self {
        Self::with_config(mode, seed, Tuning::default(), ViewportConfig::default())
    }

    pub fn with_config(mode: GameMode, seed: u64, tuning: Tuning, viewport: ViewportConfig) -> Self {
        Self {
            mode,
            phase: GamePhase::Playing,
            viewport,
            seed,
            distance: 0.0,
            score: 0,
            coins: 0,
            speed: BASE_SPEED,
            lives: START_LIVES,
            player_lane: viewport.lane_count / 2,
            elapsed: 0.0,
            boost_secs: 0.0,
            obstacles: Vec::new(),
            cars: Vec::new(),
            collectibles: Vec::new(),
            difficulty: DifficultyManager::new(tuning.clone(), seed),
            missions: (mode == GameMode::Missions)
                .then(|| MissionTracker::new(tuning.clone(), seed)),
            time_attack: (mode == GameMode::TimeAttack)
                .then(|| TimeAttackTracker::new(tuning.clone(), seed)),
            obstacle_spawn_timer: BASE_OBSTACLE_SPAWN_INTERVAL,
            car_spawn_timer: BASE_CAR_SPAWN_INTERVAL,
            tuning,
            next_id: 1,
            rng: RngState::new(seed).stream(0x5E55),
        }
    }

    /// Fresh run with the same mode, seed and balance
    pub fn reset(&mut self) {
        *self = Self::with_config(self.mode, self.seed, self.tuning.clone(), self.viewport);
    }

    /// Read-only world state for the trackers
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            distance: self.distance,
            score: self.score,
            speed: self.speed,
            boosting: self.boost_secs > 0.0,
        }
    }

    pub fn is_boosting(&self) -> bool {
        self.boost_secs > 0.0
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn player_aabb(&self) -> Aabb {
        let center = Vec2::new(
            self.viewport.lane_center_x(self.player_lane),
            self.viewport.player_y(),
        );
        Aabb::from_center(center, CAR_WIDTH, CAR_HEIGHT)
    }
}

/// Advance the session by one frame
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    debug_assert!(dt >= 0.0, "negative frame delta");

    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            GamePhase::GameOver => {}
        }
    }
    match state.phase {
        GamePhase::Paused | GamePhase::GameOver => return,
        GamePhase::Playing => {}
    }

    state.elapsed += dt;

    // --- Input ---
    if input.steer < 0 && state.player_lane > 0 {
        state.player_lane -= 1;
    } else if input.steer > 0 && state.player_lane + 1 < state.viewport.lane_count {
        state.player_lane += 1;
    }

    // --- Speed ramp and distance ---
    let base_increment = state.difficulty.settings().speed_increment;
    let increment = match &state.time_attack {
        Some(ta) => ta.scaled_speed_increment(base_increment),
        None => base_increment,
    };
    state.speed = (state.speed + increment).min(MAX_SPEED);

    let effective = state.snapshot().effective_speed();
    state.distance += effective * DISTANCE_SCALE * dt;

    // --- Difficulty before the spawner reads it ---
    // Time attack has its own clock-driven scaling; the level ramp stays
    // parked at its baseline there.
    if state.time_attack.is_none() {
        state.difficulty.update(state.distance, state.score, dt);
    }

    // --- Spawning ---
    let (obs_interval, car_interval) = state.difficulty.get_spawn_intervals();
    let obs_interval = match &state.time_attack {
        Some(ta) => ta.scaled_spawn_interval(obs_interval),
        None => obs_interval,
    };
    let (max_obstacles, max_cars) = state.difficulty.get_max_objects();

    state.obstacle_spawn_timer -= dt;
    if state.obstacle_spawn_timer <= 0.0 {
        state.obstacle_spawn_timer = obs_interval;
        let room = (max_obstacles as usize).saturating_sub(state.obstacles.len());
        if room > 0 {
            let lane_count = state.viewport.lane_count;
            let mut lanes = state.difficulty.get_obstacle_pattern(lane_count);
            // The concurrency cap wins over the pattern shape
            lanes.truncate(room);

            let open: Vec<usize> = (0..lane_count)
                .filter(|l| !lanes.contains(l))
                .collect();
            for &lane in &lanes {
                let id = state.next_entity_id();
                state.obstacles.push(Obstacle {
                    id,
                    lane,
                    pos: Vec2::new(
                        state.viewport.lane_center_x(lane),
                        state.viewport.spawn_y(),
                    ),
                    hit: false,
                    passed: false,
                });
            }
            // Sometimes sweeten an open lane with a collectible
            if !open.is_empty() && state.rng.random_bool(0.35) {
                let lane = open[state.rng.random_range(0..open.len())];
                let kind = if state.rng.random_bool(0.15) {
                    ItemKind::Powerup
                } else {
                    ItemKind::Coin
                };
                let id = state.next_entity_id();
                state.collectibles.push(Collectible {
                    id,
                    lane,
                    pos: Vec2::new(
                        state.viewport.lane_center_x(lane),
                        state.viewport.spawn_y() - 100.0,
                    ),
                    kind,
                    collected: false,
                });
            }
        }
    }

    state.car_spawn_timer -= dt;
    if state.car_spawn_timer <= 0.0 {
        state.car_spawn_timer = car_interval;
        if (state.cars.len() as u32) < max_cars {
            let aggressive = state.difficulty.should_spawn_aggressive_ai();
            let lane = state.rng.random_range(0..state.viewport.lane_count);
            let speed = state.rng.random_range(30.0..70.0);
            let id = state.next_entity_id();
            state.cars.push(TrafficCar {
                id,
                lane,
                pos: Vec2::new(
                    state.viewport.lane_center_x(lane),
                    state.viewport.spawn_y(),
                ),
                speed,
                aggressive,
                hit: false,
                passed: false,
            });
        }
    }

    // --- Entity movement ---
    let scroll = effective * state.difficulty.settings().obstacle_speed_multiplier;
    for obstacle in &mut state.obstacles {
        obstacle.pos.y += scroll * dt;
    }
    let drift_line = state.viewport.height / 2.0;
    let player_lane = state.player_lane;
    for car in &mut state.cars {
        let before = car.pos.y;
        car.pos.y += (effective - car.speed).max(20.0) * dt;
        // Aggressive cars cut one lane toward the player as they close in
        if car.aggressive && !car.hit && before < drift_line && car.pos.y >= drift_line {
            if car.lane < player_lane {
                car.lane += 1;
            } else if car.lane > player_lane {
                car.lane -= 1;
            }
            car.pos.x = state.viewport.lane_center_x(car.lane);
        }
    }
    for item in &mut state.collectibles {
        item.pos.y += effective * dt;
    }

    // --- Collision and pickup resolution ---
    let player = state.player_aabb();
    let passed_y = state.viewport.player_y() + CAR_HEIGHT;
    let mut events: Vec<WorldEvent> = Vec::new();
    let mut crashes = 0u8;

    for obstacle in &mut state.obstacles {
        if obstacle.hit || obstacle.passed {
            continue;
        }
        if obstacle.aabb().intersects(&player) {
            obstacle.hit = true;
            crashes += 1;
            events.push(WorldEvent::ObstacleHit { id: obstacle.id });
        } else if obstacle.pos.y > passed_y {
            obstacle.passed = true;
            state.score += OBSTACLE_PASS_SCORE;
            events.push(WorldEvent::ObstaclePassed { id: obstacle.id });
        }
    }

    for car in &mut state.cars {
        if car.hit || car.passed {
            continue;
        }
        if car.aabb().intersects(&player) {
            car.hit = true;
            crashes += 1;
            // A crash is a crash; trackers treat car collisions like any other
            events.push(WorldEvent::ObstacleHit { id: car.id });
        } else if car.pos.y > passed_y {
            car.passed = true;
            state.score += CAR_PASS_SCORE;
            events.push(WorldEvent::CarPassed { id: car.id });
        }
    }

    for item in &mut state.collectibles {
        if !item.collected && item.aabb().intersects(&player) {
            item.collected = true;
            match item.kind {
                ItemKind::Coin => {
                    state.coins += 1;
                    state.score += COIN_SCORE;
                }
                ItemKind::Powerup => state.boost_secs = BOOST_SECS,
            }
            events.push(WorldEvent::ItemCollected {
                id: item.id,
                kind: item.kind,
            });
        }
    }

    if crashes > 0 {
        state.lives = state.lives.saturating_sub(crashes);
        state.speed = BASE_SPEED;
        log::debug!("crash at {:.0}m, {} lives left", state.distance, state.lives);
    }
    state.boost_secs = (state.boost_secs - dt).max(0.0);

    // --- Trackers consume this frame's events, then sample the world ---
    let snap = state.snapshot();
    if let Some(missions) = &mut state.missions {
        for event in &events {
            missions.update_progress(event);
        }
        missions.tick(&snap, dt);
        if let Some(MissionOutcome::Completed { score_bonus }) = missions.take_outcome() {
            state.score += score_bonus;
        }
    }
    if let Some(ta) = &mut state.time_attack {
        for event in &events {
            ta.on_event(event);
        }
        ta.update(&snap, dt);
        if let Some(outcome) = ta.take_outcome() {
            state.score += outcome.score_bonus;
        }
        if ta.is_over() {
            state.phase = GamePhase::GameOver;
        }
    }

    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        log::info!(
            "game over: {:.0}m, score {}, {} coins",
            state.distance,
            state.score,
            state.coins
        );
    }

    // --- Despawn everything that scrolled past ---
    let despawn_y = state.viewport.despawn_y();
    state.obstacles.retain(|o| o.pos.y < despawn_y);
    state.cars.retain(|c| c.pos.y < despawn_y);
    state
        .collectibles
        .retain(|c| !c.collected && c.pos.y < despawn_y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn playing_state() -> GameState {
        GameState::new(GameMode::Endless, 12345)
    }

    /// Park an obstacle right on top of the player
    fn plant_obstacle_on_player(state: &mut GameState) -> u32 {
        let id = state.next_entity_id();
        let lane = state.player_lane;
        state.obstacles.push(Obstacle {
            id,
            lane,
            pos: Vec2::new(
                state.viewport.lane_center_x(lane),
                state.viewport.player_y(),
            ),
            hit: false,
            passed: false,
        });
        id
    }

    #[test]
    fn test_tick_pause_toggles() {
        let mut state = playing_state();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_steering_clamps_to_road() {
        let mut state = playing_state();
        for _ in 0..20 {
            tick(
                &mut state,
                &TickInput {
                    steer: -1,
                    ..Default::default()
                },
                SIM_DT,
            );
        }
        assert_eq!(state.player_lane, 0);
        for _ in 0..20 {
            tick(
                &mut state,
                &TickInput {
                    steer: 1,
                    ..Default::default()
                },
                SIM_DT,
            );
        }
        assert_eq!(state.player_lane, state.viewport.lane_count - 1);
    }

    #[test]
    fn test_obstacle_collision_costs_a_life() {
        let mut state = playing_state();
        plant_obstacle_on_player(&mut state);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.lives, START_LIVES - 1);
        assert!(state.obstacles.iter().all(|o| o.hit));
        // Crash resets the speed ramp
        assert!(state.speed <= BASE_SPEED + 1.0);
    }

    #[test]
    fn test_three_crashes_end_the_run() {
        let mut state = playing_state();
        for _ in 0..3 {
            plant_obstacle_on_player(&mut state);
            tick(&mut state, &TickInput::default(), SIM_DT);
            state.obstacles.clear();
        }
        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_passing_an_obstacle_scores() {
        let mut state = playing_state();
        let id = state.next_entity_id();
        // Different lane, already past the player
        let lane = (state.player_lane + 1) % state.viewport.lane_count;
        state.obstacles.push(Obstacle {
            id,
            lane,
            pos: Vec2::new(
                state.viewport.lane_center_x(lane),
                state.viewport.player_y() + CAR_HEIGHT + 10.0,
            ),
            hit: false,
            passed: false,
        });
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.score, OBSTACLE_PASS_SCORE);
        assert!(state.obstacles.is_empty() || state.obstacles[0].passed);
    }

    #[test]
    fn test_coin_pickup() {
        let mut state = playing_state();
        let id = state.next_entity_id();
        let lane = state.player_lane;
        state.collectibles.push(Collectible {
            id,
            lane,
            pos: Vec2::new(
                state.viewport.lane_center_x(lane),
                state.viewport.player_y(),
            ),
            kind: ItemKind::Coin,
            collected: false,
        });
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.coins, 1);
        assert_eq!(state.score, COIN_SCORE);
        assert!(state.collectibles.is_empty());
    }

    #[test]
    fn test_powerup_boost_expires() {
        let mut state = playing_state();
        let id = state.next_entity_id();
        let lane = state.player_lane;
        state.collectibles.push(Collectible {
            id,
            lane,
            pos: Vec2::new(
                state.viewport.lane_center_x(lane),
                state.viewport.player_y(),
            ),
            kind: ItemKind::Powerup,
            collected: false,
        });
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.is_boosting());

        let frames = (BOOST_SECS / SIM_DT) as usize + 2;
        for _ in 0..frames {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(!state.is_boosting());
    }

    #[test]
    fn test_object_caps_respected() {
        let mut state = playing_state();
        // Run long enough for plenty of spawn events
        for _ in 0..(60.0 / SIM_DT) as usize {
            tick(&mut state, &TickInput::default(), SIM_DT);
            let (max_obstacles, max_cars) = state.difficulty.get_max_objects();
            assert!(state.obstacles.len() as u32 <= max_obstacles);
            assert!(state.cars.len() as u32 <= max_cars);
            if state.phase == GamePhase::GameOver {
                break;
            }
        }
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(GameMode::Endless, 99999);
        let mut b = GameState::new(GameMode::Endless, 99999);
        let inputs = [
            TickInput::default(),
            TickInput {
                steer: 1,
                ..Default::default()
            },
            TickInput::default(),
            TickInput {
                steer: -1,
                ..Default::default()
            },
        ];
        for _ in 0..600 {
            for input in &inputs {
                tick(&mut a, input, SIM_DT);
                tick(&mut b, input, SIM_DT);
            }
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.coins, b.coins);
        assert_eq!(a.obstacles.len(), b.obstacles.len());
        assert!((a.distance - b.distance).abs() < 0.001);
    }

    #[test]
    fn test_reset_gives_a_fresh_run() {
        let mut state = playing_state();
        for _ in 0..300 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        state.reset();
        assert_eq!(state.distance, 0.0);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, START_LIVES);
        assert_eq!(state.difficulty.current_level(), 0);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_time_attack_clock_ends_the_run() {
        let mut state = GameState::new(GameMode::TimeAttack, 4321);
        let initial = state
            .time_attack
            .as_ref()
            .map(|ta| ta.time_remaining())
            .unwrap();
        // Bound the loop generously: completions extend the clock
        let max_frames = ((initial * 4.0) / SIM_DT) as usize;
        for _ in 0..max_frames {
            tick(&mut state, &TickInput::default(), SIM_DT);
            if state.phase == GamePhase::GameOver {
                break;
            }
        }
        // Either the clock or a crash ended it; clock path must set is_over
        if state.lives > 0 {
            assert!(state.time_attack.as_ref().unwrap().is_over());
        }
        assert_eq!(state.phase, GamePhase::GameOver);
    }
}
