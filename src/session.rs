//! Click-to-completion spin flow and reconfiguration handling.
//!
//! `WheelEngine` owns every mutable piece of a session: wheel, rotation,
//! animation, tracker, gate, phase and the rolling error log. All work is
//! cooperative on one task; the single animation slot plus the phase guard
//! stand in for locks.

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{error, info};

use crate::angle;
use crate::animation::{self, AnimationDriver};
use crate::audio::SoundPort;
use crate::backend::{SpinBackend, WheelConfig};
use crate::gate::GateController;
use crate::tracker::{ControlFace, SpinTracker};
use crate::wheel::{RotationState, Sector, WheelState};
use crate::{Result, SpinError};

const MAX_ERRORS: usize = 50;
const FALLBACK_WIN_MESSAGE: &str = "You won a prize!";

/// Session phase. The trigger is a no-op outside `Idle`.
#[derive(Clone, Debug, PartialEq)]
pub enum SpinPhase {
    Idle,
    AwaitingOutcome,
    Animating,
    ShowingResult { message: String },
}

/// Payload of an external reconfiguration: the freshly replaced sector list
/// plus its version token.
#[derive(Clone, Debug, PartialEq)]
pub struct WheelReconfig {
    pub sectors: Vec<Sector>,
    pub version_id: String,
}

/// Inbound channel for reconfiguration events, abstract from whatever
/// dispatch mechanism feeds it.
pub trait ReconfigSource {
    /// Resolves with the next configuration change, or `None` when the
    /// source is closed.
    fn next_change(&mut self) -> impl Future<Output = Option<WheelReconfig>>;
}

/// `ReconfigSource` over a tokio mpsc channel. Production feeds it from a
/// version-polling task; tests push into the sender directly.
pub struct ChannelReconfig {
    recv: tokio::sync::mpsc::Receiver<WheelReconfig>,
}

impl ChannelReconfig {
    pub fn new(recv: tokio::sync::mpsc::Receiver<WheelReconfig>) -> Self {
        Self { recv }
    }

    pub fn channel(capacity: usize) -> (tokio::sync::mpsc::Sender<WheelReconfig>, Self) {
        let (send, recv) = tokio::sync::mpsc::channel(capacity);
        (send, Self { recv })
    }
}

impl ReconfigSource for ChannelReconfig {
    async fn next_change(&mut self) -> Option<WheelReconfig> {
        self.recv.recv().await
    }
}

/// Outcome of one displayed frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameUpdate {
    pub face: ControlFace,
    /// An animation just completed; the host should refresh the gate.
    pub finished: bool,
}

pub struct WheelEngine<B, S> {
    backend: B,
    sounds: S,
    wheel: WheelState,
    rotation: RotationState,
    driver: AnimationDriver,
    tracker: SpinTracker,
    gate: GateController,
    phase: SpinPhase,
    status: String,
    rng: StdRng,
    duration_override: Option<Duration>,
    /// Bumped on every reconfiguration; responses fetched under an older
    /// generation are discarded.
    config_generation: u64,
    out_of_sync: bool,
    errors: Vec<String>,
}

impl<B: SpinBackend, S: SoundPort> WheelEngine<B, S> {
    pub fn new(backend: B, sounds: S, config: WheelConfig) -> Self {
        let gate = if config.test_mode {
            GateController::unrestricted()
        } else if config.ticket_mode {
            GateController::tickets(config.tickets)
        } else {
            GateController::cooldown()
        };
        let wheel = WheelState::new(config.sectors, config.version_id);
        let mut rotation = RotationState::baseline();
        rotation.current_sector = resting_sector(wheel.total());
        Self {
            backend,
            sounds,
            wheel,
            rotation,
            driver: AnimationDriver::new(),
            tracker: SpinTracker::new(),
            gate,
            phase: SpinPhase::Idle,
            status: String::from("Ready"),
            rng: StdRng::from_os_rng(),
            duration_override: None,
            config_generation: 0,
            out_of_sync: false,
            errors: Vec::new(),
        }
    }

    /// Deterministic randomness for tests.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Fixed animation duration instead of the randomized default.
    pub fn with_spin_duration(mut self, duration: Duration) -> Self {
        self.duration_override = Some(duration);
        self
    }

    pub fn wheel(&self) -> &WheelState {
        &self.wheel
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    pub fn phase(&self) -> &SpinPhase {
        &self.phase
    }

    pub fn gate(&self) -> &GateController {
        &self.gate
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// The session hit a version conflict; only a full restart resyncs it.
    pub fn is_out_of_sync(&self) -> bool {
        self.out_of_sync
    }

    pub fn recent_errors(&self, n: usize) -> Vec<String> {
        self.errors.iter().rev().take(n).cloned().collect()
    }

    /// Start the frame loop bookkeeping; true only on the first call.
    pub fn start_tracker(&mut self) -> bool {
        self.tracker.start()
    }

    /// Absolute rotation to display right now.
    pub fn display_angle(&self, now: Instant) -> f64 {
        self.rotation.previous_angle
            + (self.rotation.target_angle - self.rotation.previous_angle)
                * self.driver.progress(now)
    }

    /// One frame of the continuously running loop: sector tracking, tick
    /// sounds, button face, and animation completion.
    pub fn frame(&mut self, now: Instant) -> FrameUpdate {
        let idle = matches!(self.phase, SpinPhase::Idle);
        let gate_open = self.gate.permits(now);
        let face = self.tracker.frame(
            &self.wheel,
            &mut self.rotation,
            &self.driver,
            &self.sounds,
            idle,
            gate_open,
            now,
        );

        let mut finished = false;
        if let Some(done) = self.driver.finish_if_done(now) {
            self.rotation.previous_angle = done.final_angle;
            self.rotation.current_sector = angle::sector_index(done.final_angle, self.wheel.total());
            let landed = self.wheel.sector(self.rotation.current_sector);
            let message = landed
                .and_then(|s| s.message.clone())
                .unwrap_or_else(|| String::from(FALLBACK_WIN_MESSAGE));
            self.status = match landed {
                Some(s) => format!("Landed on {}", s.label),
                None => String::from("Landed"),
            };
            self.sounds.play_win();
            self.phase = SpinPhase::ShowingResult { message };
            finished = true;
        }

        FrameUpdate { face, finished }
    }

    /// User-triggered spin. Returns `Ok(false)` when the trigger was a
    /// no-op (gated, re-entrant, or superseded by a reconfiguration) and
    /// `Ok(true)` when an animation started. Errors have already reverted
    /// the session to `Idle`.
    pub async fn trigger_spin(&mut self, now: Instant) -> Result<bool> {
        if self.out_of_sync
            || !matches!(self.phase, SpinPhase::Idle)
            || self.driver.is_active()
            || !self.gate.permits(now)
        {
            return Ok(false);
        }

        self.phase = SpinPhase::AwaitingOutcome;
        self.status = String::from("Spinning...");
        let generation = self.config_generation;
        let outcome = self.backend.request_spin(self.wheel.version_id()).await;

        if generation != self.config_generation {
            // Reconfigured while the request was in flight; the reset
            // already put us back at baseline.
            return Ok(false);
        }

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => return Err(self.fail_spin(err)),
        };
        if outcome.wheel_version_id != self.wheel.version_id() {
            return Err(self.fail_spin(SpinError::VersionConflict {
                expected: outcome.wheel_version_id,
            }));
        }
        let total = self.wheel.total();
        if outcome.result < 0 || outcome.result as usize >= total {
            return Err(self.fail_spin(SpinError::InvalidOutcome {
                index: outcome.result,
                total,
            }));
        }

        let index = outcome.result as usize;
        let solution =
            angle::solve_target_angle(self.rotation.target_angle, index, total, &mut self.rng);
        let duration = self
            .duration_override
            .unwrap_or_else(|| animation::default_duration(solution.revolutions, &mut self.rng));

        self.rotation.previous_angle = self.rotation.target_angle;
        self.rotation.target_angle = solution.target_angle;
        self.driver.start(solution.target_angle, duration, now);
        self.gate.record_spin();
        self.phase = SpinPhase::Animating;
        info!(
            outcome = index,
            revolutions = solution.revolutions,
            duration_ms = duration.as_millis() as u64,
            "spin started"
        );
        Ok(true)
    }

    fn fail_spin(&mut self, err: SpinError) -> SpinError {
        self.phase = SpinPhase::Idle;
        if matches!(err, SpinError::VersionConflict { .. }) {
            self.out_of_sync = true;
            self.status = String::from("Out of sync with the server");
        } else {
            self.status = String::from("Spin failed");
        }
        self.push_error(err.to_string());
        err
    }

    /// Dismiss the result notice.
    pub fn dismiss_result(&mut self) {
        if matches!(self.phase, SpinPhase::ShowingResult { .. }) {
            self.phase = SpinPhase::Idle;
            self.status = String::from("Ready");
        }
    }

    /// Re-fetch cooldown/ticket state. Parse problems are logged but never
    /// leave the display stuck.
    pub async fn refresh_gate(&mut self, now: Instant) -> Result<()> {
        let generation = self.config_generation;
        let status = self.backend.gate_status().await;
        if generation != self.config_generation {
            return Ok(());
        }
        match status.and_then(|s| self.gate.apply_status(&s, now)) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.push_error(format!("gate refresh failed: {err}"));
                Ok(())
            }
        }
    }

    /// External reconfiguration: synchronously cancel everything and return
    /// to a clean baseline on the new sector list. No callbacks from the
    /// cancelled animation survive.
    pub fn apply_reconfiguration(&mut self, change: WheelReconfig) {
        self.config_generation += 1;
        self.driver.cancel();
        self.rotation.reset();
        self.wheel.replace(change.sectors, change.version_id);
        self.rotation.current_sector = resting_sector(self.wheel.total());
        self.phase = SpinPhase::Idle;
        self.status = String::from("Wheel reconfigured");
        info!(
            version = self.wheel.version_id(),
            sectors = self.wheel.total(),
            "wheel configuration replaced"
        );
    }

    fn push_error(&mut self, message: String) {
        error!("{message}");
        self.errors.push(message);
        if self.errors.len() > MAX_ERRORS {
            let drain = self.errors.len() - MAX_ERRORS;
            self.errors.drain(0..drain);
        }
    }
}

/// Sector under the pointer when the wheel rests at angle zero.
fn resting_sector(total: usize) -> usize {
    if total == 0 {
        0
    } else {
        angle::sector_index(0.0, total)
    }
}

