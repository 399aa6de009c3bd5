//! Sound-effect port. Playback is fire-and-forget: every trigger is an
//! independent one-shot, and a failing backend must never affect the spin
//! flow, so implementations swallow their own errors.

use std::io::Write;

use tracing::debug;

pub trait SoundPort {
    /// Short tick fired once per sector-boundary crossing. Triggers may
    /// overlap; one must not cancel another.
    fn play_tick(&self);
    /// Chime fired when a spin lands.
    fn play_win(&self);
}

/// No-op implementation for headless runs and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentSounds;

impl SoundPort for SilentSounds {
    fn play_tick(&self) {}
    fn play_win(&self) {}
}

/// Terminal bell. Each write is its own one-shot, so overlapping triggers
/// coexist naturally.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalBell;

impl TerminalBell {
    fn ring(&self) {
        let mut out = std::io::stdout();
        if let Err(err) = out.write_all(b"\x07").and_then(|()| out.flush()) {
            debug!(error = %err, "bell unavailable, continuing silently");
        }
    }
}

impl SoundPort for TerminalBell {
    fn play_tick(&self) {
        self.ring();
    }

    fn play_win(&self) {
        self.ring();
    }
}
