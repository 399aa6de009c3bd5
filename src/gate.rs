//! Spin gating: cooldown countdown, ticket balance, or unrestricted test
//! mode. Exactly one policy is active; reconfiguration replaces the whole
//! value, so there is never a second countdown running.

use std::time::Instant;

use chrono::TimeDelta;

use crate::backend::GateStatus;
use crate::{Result, SpinError};

pub const READY_MESSAGE: &str = "You can spin the wheel!";
const UNKNOWN_LABEL: &str = "--";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GatePolicy {
    /// Server-driven cooldown. `None` until the first `timeToSpin` fetch
    /// lands; unknown fails safe (locked).
    Cooldown { deadline: Option<Instant> },
    /// Ticket balance. `None` until fetched; unknown fails safe.
    Tickets { remaining: Option<u64> },
    /// Test/bypass mode: always permitted.
    Unrestricted,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GateController {
    policy: GatePolicy,
}

impl GateController {
    pub fn cooldown() -> Self {
        Self {
            policy: GatePolicy::Cooldown { deadline: None },
        }
    }

    pub fn tickets(initial: Option<u64>) -> Self {
        Self {
            policy: GatePolicy::Tickets { remaining: initial },
        }
    }

    pub fn unrestricted() -> Self {
        Self {
            policy: GatePolicy::Unrestricted,
        }
    }

    pub fn policy(&self) -> GatePolicy {
        self.policy
    }

    /// May a spin be initiated right now? Unknown state is locked.
    pub fn permits(&self, now: Instant) -> bool {
        match self.policy {
            GatePolicy::Cooldown { deadline } => deadline.is_some_and(|d| now >= d),
            GatePolicy::Tickets { remaining } => remaining.is_some_and(|n| n > 0),
            GatePolicy::Unrestricted => true,
        }
    }

    /// Countdown / ticket text, refreshed once per second by the caller.
    pub fn label(&self, now: Instant) -> String {
        match self.policy {
            GatePolicy::Cooldown { deadline: None } => String::from(UNKNOWN_LABEL),
            GatePolicy::Cooldown {
                deadline: Some(deadline),
            } => {
                if now > deadline {
                    return String::from(READY_MESSAGE);
                }
                let remaining = deadline.saturating_duration_since(now).as_secs();
                let hours = remaining / 3600;
                let minutes = remaining % 3600 / 60;
                let seconds = remaining % 60;
                format!("{hours}h {minutes}m {seconds}s")
            }
            GatePolicy::Tickets { remaining: None } => String::from(UNKNOWN_LABEL),
            GatePolicy::Tickets {
                remaining: Some(1),
            } => String::from("You have 1 ticket"),
            GatePolicy::Tickets {
                remaining: Some(n),
            } => format!("You have {n} tickets"),
            GatePolicy::Unrestricted => String::from("∞"),
        }
    }

    /// Fold an authoritative server status into the active policy. Fields
    /// for the other policy are ignored.
    pub fn apply_status(&mut self, status: &GateStatus, now: Instant) -> Result<()> {
        match &mut self.policy {
            GatePolicy::Cooldown { deadline } => {
                if let Some(raw) = &status.time_to_spin {
                    let wait = parse_time_to_spin(raw)?;
                    *deadline = Some(match wait.to_std() {
                        Ok(d) => now + d,
                        Err(_) => now,
                    });
                }
            }
            GatePolicy::Tickets { remaining } => {
                if status.tickets.is_some() {
                    *remaining = status.tickets;
                }
            }
            GatePolicy::Unrestricted => {}
        }
        Ok(())
    }

    /// Optimistic bookkeeping when a spin request succeeded: the displayed
    /// ticket count drops by one (clamped at zero) until the next
    /// authoritative refresh. Cooldowns wait for the refresh instead.
    pub fn record_spin(&mut self) {
        if let GatePolicy::Tickets {
            remaining: Some(n),
        } = &mut self.policy
        {
            *n = n.saturating_sub(1);
        }
    }

    pub fn replace(&mut self, policy: GatePolicy) {
        self.policy = policy;
    }
}

/// Parse the server's `timeToSpin` string: `"H:M:S"` (seconds may carry a
/// fractional part) or `"N day(s), H:M:S"`, with the day count folded into
/// total hours.
pub fn parse_time_to_spin(raw: &str) -> Result<TimeDelta> {
    let bad = |raw: &str| SpinError::Network(format!("invalid timeToSpin value: {raw:?}"));

    let (days, clock) = match raw.split_once(", ") {
        Some((day_part, rest)) => {
            let count = day_part
                .strip_suffix(" days")
                .or_else(|| day_part.strip_suffix(" day"))
                .ok_or_else(|| bad(raw))?;
            let days: i64 = count.trim().parse().map_err(|_| bad(raw))?;
            (days, rest)
        }
        None => (0, raw),
    };

    let mut parts = clock.split(':');
    let (hours, minutes, seconds) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(m), Some(s), None) => {
            let hours: i64 = h.trim().parse().map_err(|_| bad(raw))?;
            let minutes: i64 = m.trim().parse().map_err(|_| bad(raw))?;
            let seconds: f64 = s.trim().parse().map_err(|_| bad(raw))?;
            (hours, minutes, seconds)
        }
        _ => return Err(bad(raw)),
    };
    if hours < 0 || !(0..60).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
        return Err(bad(raw));
    }

    // Huge but parseable numbers are rejected, never panicked on.
    let total_hours = days
        .checked_mul(24)
        .and_then(|h| h.checked_add(hours))
        .ok_or_else(|| bad(raw))?;
    TimeDelta::try_hours(total_hours)
        .ok_or_else(|| bad(raw))?
        .checked_add(&TimeDelta::minutes(minutes))
        .and_then(|wait| {
            wait.checked_add(&TimeDelta::milliseconds((seconds * 1000.0).round() as i64))
        })
        .ok_or_else(|| bad(raw))
}
