//! Clock and timing utilities.
//!
//! Two independent cadences meet in a Tinsel session:
//! - the tracker cadence, gated to a minimum frame interval ([`RateController`])
//! - the render cadence, which feeds wall-clock deltas to animations ([`TickClock`])
//!
//! Both take nanoseconds since session start; where those come from is up to
//! the caller.

use std::time::Duration;

/// Largest render delta (seconds) handed to animations in one tick.
pub const MAX_TICK_DELTA_SECS: f64 = 0.25;

/// Wall-clock stamp of the moment a session started.
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// Wall-clock time at epoch (RFC 3339).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new session clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Convert a nanosecond value to seconds.
    pub fn ns_to_secs(ns: u64) -> f64 {
        ns as f64 / 1_000_000_000.0
    }
}

/// Minimum-interval gate: admits a tick only if enough time has passed
/// since the last admitted one. Rejected ticks are simply dropped.
#[derive(Debug, Clone)]
pub struct RateController {
    min_interval_ns: u64,
    last_tick_ns: Option<u64>,
}

impl RateController {
    /// Create a gate admitting at most one tick per `min_interval`.
    pub fn with_min_interval(min_interval: Duration) -> Self {
        Self {
            min_interval_ns: min_interval.as_nanos() as u64,
            last_tick_ns: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        match self.last_tick_ns {
            None => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            Some(last) if current_ns >= last.saturating_add(self.min_interval_ns) => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            _ => false,
        }
    }

    /// Earliest time the next tick will be admitted; `None` before the first.
    pub fn next_tick_ns(&self) -> Option<u64> {
        self.last_tick_ns.map(|last| last.saturating_add(self.min_interval_ns))
    }
}

/// Turns successive render-tick timestamps into clamped `Δt` seconds.
#[derive(Debug, Clone, Default)]
pub struct TickClock {
    last_ns: Option<u64>,
}

impl TickClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta since the previous tick, in seconds.
    ///
    /// The first tick yields 0. Time going backwards yields 0, and a stalled
    /// loop is capped at [`MAX_TICK_DELTA_SECS`].
    pub fn delta_secs(&mut self, now_ns: u64) -> f64 {
        let delta = match self.last_ns {
            None => 0.0,
            Some(last) if now_ns <= last => 0.0,
            Some(last) => SessionClock::ns_to_secs(now_ns - last),
        };
        self.last_ns = Some(now_ns.max(self.last_ns.unwrap_or(0)));
        delta.min(MAX_TICK_DELTA_SECS)
    }
}
