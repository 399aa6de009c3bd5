//! Per-frame sector tracking. The loop runs every displayed frame whether or
//! not a spin is active, so the idle button face stays correct; it is
//! started exactly once per session.

use std::time::Instant;

use crate::angle;
use crate::animation::AnimationDriver;
use crate::audio::SoundPort;
use crate::wheel::{RotationState, WheelState};

/// Visual state of the spin control.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlFace {
    /// Idle and the gate permits a spin.
    Ready,
    /// Idle but gated (cooldown running, no tickets, or state unknown).
    Locked,
    /// Animation in flight: show the sector currently under the pointer.
    InProgress { label: String, color: String },
}

impl Default for ControlFace {
    fn default() -> Self {
        ControlFace::Locked
    }
}

#[derive(Debug, Default)]
pub struct SpinTracker {
    started: bool,
}

impl SpinTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent start guard: true only the first time.
    pub fn start(&mut self) -> bool {
        if self.started {
            return false;
        }
        self.started = true;
        true
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// One frame: sample the animation, resolve the sector under the
    /// pointer, tick once per boundary crossing, and report the button face.
    ///
    /// `idle` is true when the session is in its resting phase (no request
    /// in flight, no result showing); `gate_open` is the gate's current
    /// verdict, already failed-safe to locked when unknown.
    pub fn frame(
        &mut self,
        wheel: &WheelState,
        rotation: &mut RotationState,
        driver: &AnimationDriver,
        sounds: &impl SoundPort,
        idle: bool,
        gate_open: bool,
        now: Instant,
    ) -> ControlFace {
        let progress = driver.progress(now);
        let interpolated = rotation.previous_angle
            + (rotation.target_angle - rotation.previous_angle) * progress;
        let sector = angle::sector_index(interpolated, wheel.total());

        if sector != rotation.current_sector {
            rotation.current_sector = sector;
            sounds.play_tick();
        }

        if driver.is_active() {
            let (label, color) = wheel
                .sector(sector)
                .map(|s| (s.label.clone(), s.color.clone()))
                .unwrap_or_default();
            ControlFace::InProgress { label, color }
        } else if idle && gate_open {
            ControlFace::Ready
        } else {
            ControlFace::Locked
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::TAU;
    use crate::wheel::Sector;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingSounds {
        ticks: AtomicUsize,
    }

    impl SoundPort for CountingSounds {
        fn play_tick(&self) {
            self.ticks.fetch_add(1, Ordering::Relaxed);
        }
        fn play_win(&self) {}
    }

    fn wheel(total: usize) -> WheelState {
        let sectors = (0..total)
            .map(|i| Sector {
                label: format!("sector {i}"),
                color: String::from("#123456"),
                message: None,
                function: String::from("builtins.default"),
                args: serde_json::Map::new(),
            })
            .collect();
        WheelState::new(sectors, "v1")
    }

    #[test]
    fn start__is_idempotent() {
        let mut tracker = SpinTracker::new();
        assert!(tracker.start());
        assert!(!tracker.start());
        assert!(tracker.is_started());
    }

    #[test]
    fn frame__ticks_once_per_boundary_crossing() {
        let wheel = wheel(8);
        let sounds = CountingSounds::default();
        let mut tracker = SpinTracker::new();
        let mut driver = AnimationDriver::new();
        let t0 = Instant::now();

        let mut rotation = RotationState::baseline();
        rotation.target_angle = 2.0 * TAU + 3.0 * angle::arc_width(8) + 0.1;
        driver.start(rotation.target_angle, Duration::from_millis(1000), t0);

        // Dense sampling: every crossing is observed as a distinct change.
        let mut distinct = vec![rotation.current_sector];
        for ms in (0..=1200).step_by(2) {
            let before = rotation.current_sector;
            tracker.frame(
                &wheel,
                &mut rotation,
                &driver,
                &sounds,
                false,
                false,
                t0 + Duration::from_millis(ms),
            );
            if rotation.current_sector != before {
                distinct.push(rotation.current_sector);
            }
        }

        assert_eq!(sounds.ticks.load(Ordering::Relaxed), distinct.len() - 1);
        // Final sector agrees with the target angle.
        assert_eq!(
            rotation.current_sector,
            angle::sector_index(rotation.target_angle, 8)
        );
    }

    #[test]
    fn frame__idle_face_follows_gate() {
        let wheel = wheel(4);
        let sounds = CountingSounds::default();
        let mut tracker = SpinTracker::new();
        let driver = AnimationDriver::new();
        let mut rotation = RotationState::baseline();
        let now = Instant::now();

        let face = tracker.frame(&wheel, &mut rotation, &driver, &sounds, true, true, now);
        assert_eq!(face, ControlFace::Ready);

        let face = tracker.frame(&wheel, &mut rotation, &driver, &sounds, true, false, now);
        assert_eq!(face, ControlFace::Locked);

        // Not idle (request in flight) is locked even with an open gate.
        let face = tracker.frame(&wheel, &mut rotation, &driver, &sounds, false, true, now);
        assert_eq!(face, ControlFace::Locked);
    }

    #[test]
    fn frame__active_animation_shows_current_sector() {
        let wheel = wheel(4);
        let sounds = CountingSounds::default();
        let mut tracker = SpinTracker::new();
        let mut driver = AnimationDriver::new();
        let t0 = Instant::now();

        let mut rotation = RotationState::baseline();
        rotation.target_angle = TAU / 8.0;
        driver.start(rotation.target_angle, Duration::from_millis(100), t0);

        let face = tracker.frame(
            &wheel,
            &mut rotation,
            &driver,
            &sounds,
            false,
            false,
            t0 + Duration::from_millis(99),
        );
        match face {
            ControlFace::InProgress { label, .. } => {
                assert_eq!(label, format!("sector {}", rotation.current_sector));
            }
            other => panic!("expected InProgress, got {other:?}"),
        }
    }
}
