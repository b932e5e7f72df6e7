//! Lane Rush headless demo
//!
//! Drives a seeded run with a simple autopilot, logs progression, and
//! records the result on the local leaderboard. Useful for balance passes:
//! `RUST_LOG=info lane-rush [endless|time-attack|missions] [seed]`

use std::path::PathBuf;

use lane_rush::consts::SIM_DT;
use lane_rush::highscores::{HighScoreEntry, HighScores, format_date};
use lane_rush::sim::{GameMode, GamePhase, GameState, TickInput, tick};

const SCORES_FILE: &str = "lane_rush_scores.json";

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let mode = match args.next().as_deref() {
        Some("time-attack") => GameMode::TimeAttack,
        Some("missions") => GameMode::Missions,
        _ => GameMode::Endless,
    };
    let seed: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xC0FFEE);

    let mut state = GameState::new(mode, seed);
    log::info!("starting {} run with seed {seed}", mode.as_str());

    // Ten simulated minutes, tops
    let max_frames = (600.0 / SIM_DT) as usize;
    for _ in 0..max_frames {
        let input = TickInput {
            steer: autopilot(&state),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    println!("--- run over ---");
    println!("mode:     {}", state.mode.as_str());
    println!("distance: {:.0}m", state.distance);
    println!("score:    {}", state.score);
    println!("coins:    {}", state.coins);
    println!("level:    {}", state.difficulty.current_level());
    if let Some(missions) = &state.missions {
        println!("mission:  {}", missions.description());
    }
    if let Some(ta) = &state.time_attack {
        println!("clock:    {:.1}s left", ta.time_remaining());
    }

    let path = PathBuf::from(SCORES_FILE);
    let mut scores = HighScores::load(&path);
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let made_board = scores.record_if_high(
        state.mode,
        HighScoreEntry {
            name: "AUTO".to_string(),
            score: state.score,
            distance: state.distance as u32,
            coins: state.coins,
            date: format_date(now),
        },
    );
    if made_board {
        match scores.save(&path) {
            Ok(()) => println!("made the {} leaderboard!", state.mode.as_str()),
            Err(err) => log::error!("could not save scores: {err}"),
        }
    }
}

/// Steer toward the lane with the most headroom once something gets close
fn autopilot(state: &GameState) -> i8 {
    let player = state.player_lane;
    let player_y = state.viewport.player_y();

    // Distance to the nearest threat bearing down on a lane
    let headroom = |lane: usize| -> f32 {
        let mut closest = f32::MAX;
        for o in &state.obstacles {
            if o.lane == lane && !o.hit && o.pos.y < player_y {
                closest = closest.min(player_y - o.pos.y);
            }
        }
        for c in &state.cars {
            if c.lane == lane && !c.hit && c.pos.y < player_y {
                closest = closest.min(player_y - c.pos.y);
            }
        }
        closest
    };

    let here = headroom(player);
    if here > 250.0 {
        return 0;
    }
    let left = if player > 0 {
        headroom(player - 1)
    } else {
        f32::MIN
    };
    let right = if player + 1 < state.viewport.lane_count {
        headroom(player + 1)
    } else {
        f32::MIN
    };

    if left >= here && left >= right {
        -1
    } else if right > here {
        1
    } else {
        0
    }
}
