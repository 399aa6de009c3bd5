#![allow(non_snake_case)]

use lucky_wheel::angle::{self, TAU};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

prop_compose! {
    fn wheel_and_outcome()(total in 1usize..=24)(outcome in 0..total, total in Just(total)) -> (usize, usize) {
        (total, outcome)
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

    #[test]
    fn solve_target_angle__always_lands_on_the_requested_sector(
        (total, outcome) in wheel_and_outcome(),
        current in -1000.0f64..1000.0,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let solution = angle::solve_target_angle(current, outcome, total, &mut rng);
        prop_assert_eq!(angle::sector_index(solution.target_angle, total), outcome);
    }

    #[test]
    fn solve_target_angle__folds_in_two_or_three_surplus_turns(
        (total, outcome) in wheel_and_outcome(),
        current in -1000.0f64..1000.0,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let solution = angle::solve_target_angle(current, outcome, total, &mut rng);

        prop_assert!(solution.revolutions == 2 || solution.revolutions == 3);
        // Always spins forward, by at least the surplus turns and at most
        // one extra wheel-around to reach the target wedge.
        let travelled = solution.target_angle - current;
        prop_assert!(travelled >= TAU * solution.revolutions as f64);
        prop_assert!(travelled < TAU * (solution.revolutions + 1) as f64);
    }

    #[test]
    fn sector_index__agrees_with_the_drawing_order(total in 1usize..=24) {
        let arc = angle::arc_width(total);
        // The wedge drawn at [arc*i, arc*(i+1)) sits under the pointer for
        // rotations in [arc*(total-i-1), arc*(total-i)).
        for i in 0..total {
            let rotation = arc * (total - i - 1) as f64 + arc * 0.5;
            prop_assert_eq!(angle::sector_index(rotation, total), i);
        }
    }

    #[test]
    fn normalize__is_stable_under_full_turns(
        a in -1000.0f64..1000.0,
        turns in -5i32..=5,
    ) {
        let shifted = angle::normalize(a + TAU * turns as f64);
        let base = angle::normalize(a);
        let delta = (shifted - base).abs();
        // Equal up to float error, possibly wrapped across the seam.
        prop_assert!(delta < 1e-9 || (TAU - delta) < 1e-9);
    }
}
