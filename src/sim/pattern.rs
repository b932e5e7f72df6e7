//! Obstacle pattern archetypes and their expansion into lane indices
//!
//! A pattern is an ephemeral set of lanes to fill for one spawn event. The
//! archetype is rolled from a table keyed by the difficulty manager's
//! complexity tier, then expanded procedurally. Selection is intentionally
//! randomized; only structural properties are stable (a `gap` always leaves
//! exactly one lane open, a `wall` always leaves its gap window open).

use rand::Rng;
use rand::seq::index;

/// Named obstacle-layout templates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Archetype {
    /// One random lane
    Single,
    /// Every lane except one - forces the player into the gap
    Gap,
    /// Two adjacent lanes
    Double,
    /// Skip pattern; widens into a stepping pattern at high complexity
    Zigzag,
    /// Every lane except a contiguous gap window
    Wall,
    /// Every lane except two independently sampled gap lanes
    DoubleGap,
    /// Every lane except a target lane and its immediate left neighbor
    Funnel,
    /// `lane_count - 2` lanes sampled without replacement
    Maze,
    /// Every even-indexed lane
    Alternating,
}

/// Archetype tables per complexity tier (0..=3)
const TIER_TABLES: [&[Archetype]; 4] = [
    &[Archetype::Single, Archetype::Double],
    &[
        Archetype::Single,
        Archetype::Double,
        Archetype::Gap,
        Archetype::Zigzag,
    ],
    &[
        Archetype::Gap,
        Archetype::Zigzag,
        Archetype::Wall,
        Archetype::DoubleGap,
        Archetype::Alternating,
    ],
    &[
        Archetype::Wall,
        Archetype::DoubleGap,
        Archetype::Funnel,
        Archetype::Maze,
        Archetype::Zigzag,
        Archetype::Alternating,
    ],
];

/// Roll an archetype for the given complexity tier and expand it.
///
/// Returns a sorted, deduplicated set of lane indices, all `< lane_count`.
/// `lane_count < 2` is a contract violation.
pub fn generate<R: Rng>(rng: &mut R, complexity: u8, lane_count: usize) -> Vec<usize> {
    debug_assert!(lane_count >= 2, "pattern generation needs at least 2 lanes");
    let table = TIER_TABLES[(complexity as usize).min(TIER_TABLES.len() - 1)];
    let archetype = table[rng.random_range(0..table.len())];

    let mut lanes = expand(rng, archetype, complexity, lane_count);
    lanes.retain(|&l| l < lane_count);
    lanes.sort_unstable();
    lanes.dedup();

    // Whatever happens, a spawn event always produces at least one obstacle
    if lanes.is_empty() {
        lanes.push(rng.random_range(0..lane_count));
    }
    lanes
}

fn expand<R: Rng>(
    rng: &mut R,
    archetype: Archetype,
    complexity: u8,
    lane_count: usize,
) -> Vec<usize> {
    match archetype {
        Archetype::Single => vec![rng.random_range(0..lane_count)],

        Archetype::Gap => {
            let open = rng.random_range(0..lane_count);
            (0..lane_count).filter(|&l| l != open).collect()
        }

        Archetype::Double => {
            let start = rng.random_range(0..lane_count - 1);
            vec![start, start + 1]
        }

        Archetype::Zigzag => {
            let start = rng.random_range(0..lane_count);
            if complexity < 2 {
                // Simple two-lane skip
                vec![start, (start + 2) % lane_count]
            } else {
                // Three-lane stepping, step size 2, wrapping
                (0..3).map(|i| (start + 2 * i) % lane_count).collect()
            }
        }

        Archetype::Wall => {
            let gap_size = wall_gap_size(rng, complexity, lane_count);
            let gap_start = rng.random_range(0..=lane_count - gap_size);
            expand_wall(lane_count, gap_start, gap_size)
        }

        Archetype::DoubleGap => {
            let a = rng.random_range(0..lane_count);
            let b = rng.random_range(0..lane_count);
            (0..lane_count).filter(|&l| l != a && l != b).collect()
        }

        Archetype::Funnel => {
            let target = rng.random_range(1..lane_count);
            (0..lane_count)
                .filter(|&l| l != target && l != target - 1)
                .collect()
        }

        Archetype::Maze => {
            let amount = lane_count.saturating_sub(2);
            index::sample(rng, lane_count, amount).into_vec()
        }

        Archetype::Alternating => (0..lane_count).step_by(2).collect(),
    }
}

/// Gap window width for a wall: narrows to a single lane at top complexity
fn wall_gap_size<R: Rng>(rng: &mut R, complexity: u8, lane_count: usize) -> usize {
    let gap = if complexity >= 3 && rng.random_bool(0.5) {
        1
    } else {
        2
    };
    gap.min(lane_count - 1)
}

/// All lanes except a contiguous `gap_size` window starting at `gap_start`
pub(crate) fn expand_wall(lane_count: usize, gap_start: usize, gap_size: usize) -> Vec<usize> {
    debug_assert!(gap_size >= 1 && gap_start + gap_size <= lane_count);
    (0..lane_count)
        .filter(|&l| l < gap_start || l >= gap_start + gap_size)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_wall_leaves_exactly_the_gap_window_open() {
        for lane_count in 3..=8usize {
            for gap_size in 1..=2usize {
                for gap_start in 0..=(lane_count - gap_size) {
                    let lanes = expand_wall(lane_count, gap_start, gap_size);
                    assert_eq!(lanes.len(), lane_count - gap_size);
                    for l in gap_start..gap_start + gap_size {
                        assert!(!lanes.contains(&l), "gap lane {l} was filled");
                    }
                }
            }
        }
    }

    #[test]
    fn test_alternating_fills_even_lanes() {
        let mut rng = Pcg32::seed_from_u64(7);
        let lanes = expand(&mut rng, Archetype::Alternating, 2, 6);
        assert_eq!(lanes, vec![0, 2, 4]);
    }

    #[test]
    fn test_funnel_leaves_two_adjacent_lanes_open() {
        let mut rng = Pcg32::seed_from_u64(99);
        for _ in 0..50 {
            let lane_count = 6;
            let lanes = expand(&mut rng, Archetype::Funnel, 3, lane_count);
            assert_eq!(lanes.len(), lane_count - 2);
            let open: Vec<usize> = (0..lane_count).filter(|l| !lanes.contains(l)).collect();
            assert_eq!(open.len(), 2);
            assert_eq!(open[1], open[0] + 1, "funnel gap must be adjacent");
        }
    }

    #[test]
    fn test_maze_samples_without_replacement() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..50 {
            let mut lanes = expand(&mut rng, Archetype::Maze, 3, 6);
            let before = lanes.len();
            lanes.sort_unstable();
            lanes.dedup();
            assert_eq!(lanes.len(), before, "maze produced a duplicate lane");
            assert_eq!(before, 4);
        }
    }

    proptest! {
        #[test]
        fn prop_gap_leaves_exactly_one_lane(seed in 0u64..1000, lane_count in 2usize..12) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let lanes = expand(&mut rng, Archetype::Gap, 2, lane_count);
            prop_assert_eq!(lanes.len(), lane_count - 1);
            let open: Vec<usize> = (0..lane_count).filter(|l| !lanes.contains(l)).collect();
            prop_assert_eq!(open.len(), 1);
        }

        #[test]
        fn prop_generated_lanes_are_valid(
            seed in 0u64..2000,
            complexity in 0u8..=3,
            lane_count in 2usize..10,
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let lanes = generate(&mut rng, complexity, lane_count);
            prop_assert!(!lanes.is_empty());
            for &l in &lanes {
                prop_assert!(l < lane_count);
            }
            // Sorted and unique
            for w in lanes.windows(2) {
                prop_assert!(w[0] < w[1]);
            }
        }

        #[test]
        fn prop_double_is_two_adjacent_lanes(seed in 0u64..1000, lane_count in 2usize..10) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let lanes = expand(&mut rng, Archetype::Double, 0, lane_count);
            prop_assert_eq!(lanes.len(), 2);
            prop_assert_eq!(lanes[1], lanes[0] + 1);
        }
    }
}
