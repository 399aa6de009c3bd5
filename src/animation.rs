//! The single in-flight rotation animation.
//!
//! `AnimationDriver` owns at most one animation at a time; starting a new
//! one replaces the previous. In a cooperative single-task loop that Option
//! is the whole locking discipline the spin flow needs.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::angle::TAU;

#[derive(Debug, Default)]
pub struct AnimationDriver {
    active: Option<SpinAnimation>,
}

#[derive(Clone, Debug)]
struct SpinAnimation {
    target: f64,
    started: Instant,
    duration: Duration,
}

/// Yielded exactly once when an animation runs to its natural end.
/// Cancelled animations never produce one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FinishedSpin {
    pub final_angle: f64,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin animating towards `target`, replacing any active animation.
    pub fn start(&mut self, target: f64, duration: Duration, now: Instant) {
        self.active = Some(SpinAnimation {
            target,
            started: now,
            duration,
        });
    }

    /// Stop immediately, discarding visual progress and the pending
    /// completion.
    pub fn cancel(&mut self) {
        self.active = None;
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Eased interpolation fraction in `[0, 1]`, `0.0` when idle.
    pub fn progress(&self, now: Instant) -> f64 {
        match &self.active {
            Some(animation) => ease_in_out(animation.raw_progress(now)),
            None => 0.0,
        }
    }

    /// Consume the animation if it has reached its end.
    pub fn finish_if_done(&mut self, now: Instant) -> Option<FinishedSpin> {
        let done = self
            .active
            .as_ref()
            .is_some_and(|animation| animation.raw_progress(now) >= 1.0);
        if !done {
            return None;
        }
        self.active.take().map(|animation| FinishedSpin {
            final_angle: animation.target,
        })
    }
}

impl SpinAnimation {
    fn raw_progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }
}

/// Cubic ease-in/ease-out timing curve.
pub fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
    }
}

/// Default spin duration: a random multi-second base scaled by the surplus
/// turns, so longer spins take visibly longer.
pub fn default_duration(revolutions: u32, rng: &mut impl Rng) -> Duration {
    let base_ms = rng.random_range(6000.0..8000.0);
    let ms = base_ms * (revolutions as f64 * TAU) * 0.1;
    Duration::from_millis(ms as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_in_out__pins_endpoints() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert!((ease_in_out(1.0) - 1.0).abs() < 1e-12);
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn progress__is_monotonic_and_clamped() {
        let t0 = Instant::now();
        let mut driver = AnimationDriver::new();
        driver.start(10.0, Duration::from_millis(1000), t0);

        let mut last = -1.0;
        for ms in [0u64, 100, 250, 500, 750, 999, 1000, 2000] {
            let p = driver.progress(t0 + Duration::from_millis(ms));
            assert!(p >= last, "progress went backwards at {ms}ms");
            assert!((0.0..=1.0).contains(&p));
            last = p;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn finish_if_done__fires_exactly_once() {
        let t0 = Instant::now();
        let mut driver = AnimationDriver::new();
        driver.start(7.5, Duration::from_millis(100), t0);

        let after = t0 + Duration::from_millis(150);
        assert!(driver.finish_if_done(t0).is_none());
        assert_eq!(
            driver.finish_if_done(after),
            Some(FinishedSpin { final_angle: 7.5 })
        );
        assert!(driver.finish_if_done(after).is_none());
        assert!(!driver.is_active());
    }

    #[test]
    fn cancel__suppresses_completion() {
        let t0 = Instant::now();
        let mut driver = AnimationDriver::new();
        driver.start(3.0, Duration::from_millis(100), t0);
        driver.cancel();

        assert!(!driver.is_active());
        assert_eq!(driver.progress(t0 + Duration::from_secs(1)), 0.0);
        assert!(driver.finish_if_done(t0 + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn start__replaces_active_animation() {
        let t0 = Instant::now();
        let mut driver = AnimationDriver::new();
        driver.start(3.0, Duration::from_millis(100), t0);
        driver.start(9.0, Duration::from_millis(100), t0);

        let finished = driver.finish_if_done(t0 + Duration::from_secs(1)).unwrap();
        // Only the replacement completes.
        assert_eq!(finished.final_angle, 9.0);
        assert!(driver.finish_if_done(t0 + Duration::from_secs(2)).is_none());
    }

    #[test]
    fn default_duration__scales_with_revolutions() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let two = default_duration(2, &mut rng);
            let three = default_duration(3, &mut rng);
            assert!(two >= Duration::from_millis(7500));
            assert!(three <= Duration::from_millis(15100));
        }
    }
}
