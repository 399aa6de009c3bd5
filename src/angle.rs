//! Pure angle math shared by the solver, the frame tracker and the renderer.
//!
//! The wheel rotates under a pointer fixed "north". One convention ties the
//! three users together: sector `i` is drawn over `[arc*i, arc*(i+1))` and
//! the sector under the pointer at absolute rotation `a` is
//! `(total - floor(normalize(a) / TAU * total) - 1) mod total`. The solver
//! and the renderer are not independently choosable; changing one side
//! silently lands the wheel on the wrong sector.

use rand::Rng;

pub use std::f64::consts::TAU;

/// Angular width of one sector.
pub fn arc_width(total: usize) -> f64 {
    TAU / total as f64
}

/// Wrap any finite angle into `[0, TAU)`.
pub fn normalize(angle: f64) -> f64 {
    let wrapped = angle % TAU;
    if wrapped < 0.0 { wrapped + TAU } else { wrapped }
}

/// Sector index currently under the pointer for an absolute rotation.
pub fn sector_index(angle: f64, total: usize) -> usize {
    debug_assert!(total >= 1);
    let slot = (normalize(angle) / TAU * total as f64).floor() as i64;
    (total as i64 - slot - 1).rem_euclid(total as i64) as usize
}

/// A solved spin target: the new absolute angle plus the surplus turns that
/// were folded into it (the animation scales its duration by them).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpinSolution {
    pub target_angle: f64,
    pub revolutions: u32,
}

/// Compute the absolute angle the wheel must stop at so that
/// `sector_index(target_angle, total) == outcome`.
///
/// The stop point gets a uniform offset in `[0, 0.7*arc)` so it never sits
/// exactly on a sector boundary, and 2 or 3 full surplus turns for visual
/// effect. The outcome itself always comes from the server; this only
/// translates it into rotation.
pub fn solve_target_angle(
    current: f64,
    outcome: usize,
    total: usize,
    rng: &mut impl Rng,
) -> SpinSolution {
    debug_assert!(outcome < total);
    let arc = arc_width(total);
    let current_abs = normalize(current);

    // Base angle inside the target wedge, then backtrack a bit off the edge.
    let mut stop = arc * (total - outcome - 1) as f64;
    stop += rng.random_range(0.0..arc * 0.7);
    let stop = normalize(stop);

    let diff = normalize(stop - current_abs);
    let revolutions = rng.random_range(2u32..4);

    SpinSolution {
        target_angle: current + diff + TAU * revolutions as f64,
        revolutions,
    }
}
