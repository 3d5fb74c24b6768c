//! Shared formation progress.
//!
//! `progress` approaches the macro-state target with a delta-time-scaled
//! exponential step, so the transition takes the same wall-clock time at any
//! render rate. Every consumer that turns progress into motion must go
//! through [`ease_in_out_cubic`]; the same input always yields the same bits,
//! which is what keeps independently animated layers in lockstep.

use tinsel_common::config::RenderConfig;
use tinsel_hand_model::MacroState;

/// Linear interpolation from `a` to `b` by `t`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Cubic ease-in-out: `4x³` below one half, `1 − (2 − 2x)³ / 2` above.
pub fn ease_in_out_cubic(x: f64) -> f64 {
    if x < 0.5 {
        4.0 * x * x * x
    } else {
        1.0 - (-2.0 * x + 2.0).powi(3) / 2.0
    }
}

/// One delta-time exponential step from `current` toward `target`.
///
/// The step fraction `rate·dt` is clamped to `[0, 1]`, so a long frame lands
/// on the target instead of overshooting it.
pub fn approach(current: f64, target: f64, rate: f64, dt: f64) -> f64 {
    let t = (rate * dt).clamp(0.0, 1.0);
    lerp(current, target, t)
}

/// Smallest settle distance; below this the approach can stall on rounding.
pub const MIN_SETTLE_EPSILON: f64 = 1e-9;

/// Integrates formation progress toward the current macro-state target.
#[derive(Debug, Clone)]
pub struct ProgressSynchronizer {
    progress: f64,
    rate: f64,
    settle_epsilon: f64,
}

impl ProgressSynchronizer {
    /// Starts at 0 so an initially assembled formation animates in.
    pub fn new(rate: f64, settle_epsilon: f64) -> Self {
        Self {
            progress: 0.0,
            rate,
            settle_epsilon: settle_epsilon.max(MIN_SETTLE_EPSILON),
        }
    }

    pub fn with_defaults() -> Self {
        Self::from_config(&RenderConfig::default())
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.progress_rate, config.settle_epsilon)
    }

    /// Start from an explicit value (clamped to `[0, 1]`).
    pub fn starting_at(mut self, progress: f64) -> Self {
        self.progress = progress.clamp(0.0, 1.0);
        self
    }

    /// Advance one render tick of `dt` seconds. Returns the new progress.
    pub fn advance(&mut self, state: MacroState, dt: f64) -> f64 {
        let target = state.target_progress();
        if (self.progress - target).abs() <= self.settle_epsilon {
            self.progress = target;
            return self.progress;
        }

        let next = approach(self.progress, target, self.rate, dt);
        // A real step that rounds to no movement is as close as f64 gets.
        let stalled = next == self.progress && self.rate * dt > 0.0;
        self.progress = if stalled || (next - target).abs() <= self.settle_epsilon {
            target
        } else {
            next
        };
        self.progress
    }

    /// Raw (linear) progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Progress after the shared ease curve.
    pub fn eased(&self) -> f64 {
        ease_in_out_cubic(self.progress)
    }

    /// Whether progress sits exactly on the target of `state`.
    pub fn is_settled(&self, state: MacroState) -> bool {
        self.progress == state.target_progress()
    }
}

impl Default for ProgressSynchronizer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Per-subsystem visibility scalar (opacity, scale) easing toward 0 or 1.
///
/// Not part of the shared progress: each subsystem fades at its own rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityFader {
    value: f64,
    rate: f64,
}

impl VisibilityFader {
    /// A fader at `initial`, moving at `rate` per second.
    pub fn new(initial: f64, rate: f64) -> Self {
        Self {
            value: initial,
            rate,
        }
    }

    /// Step toward 1 when `visible`, else toward 0.
    pub fn advance(&mut self, visible: bool, dt: f64) -> f64 {
        self.advance_to(if visible { 1.0 } else { 0.0 }, dt)
    }

    /// Step toward an arbitrary target.
    pub fn advance_to(&mut self, target: f64, dt: f64) -> f64 {
        self.value = approach(self.value, target, self.rate, dt);
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    #[test]
    fn test_ease_endpoints_and_midpoint() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert_eq!(ease_in_out_cubic(0.5), 0.5);
        assert!((ease_in_out_cubic(0.25) - 0.0625).abs() < 1e-12);
        assert!((ease_in_out_cubic(0.75) - 0.9375).abs() < 1e-12);
    }

    #[test]
    fn test_ease_is_monotonic() {
        let mut prev = ease_in_out_cubic(0.0);
        for i in 1..=1000 {
            let next = ease_in_out_cubic(i as f64 / 1000.0);
            assert!(next >= prev);
            prev = next;
        }
    }

    #[test]
    fn test_approach_never_overshoots() {
        assert_eq!(approach(0.2, 1.0, 2.0, 10.0), 1.0);
        assert_eq!(approach(0.2, 1.0, 2.0, -1.0), 0.2);
        assert!((approach(0.0, 1.0, 2.0, 0.25) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_progress_reaches_target_and_stays() {
        let mut sync = ProgressSynchronizer::with_defaults();
        let mut ticks = 0;
        while !sync.is_settled(MacroState::Assembled) {
            sync.advance(MacroState::Assembled, DT);
            ticks += 1;
            assert!(ticks < 1000, "did not settle");
        }
        assert_eq!(sync.progress(), 1.0);
        assert_eq!(sync.eased(), 1.0);
        sync.advance(MacroState::Assembled, DT);
        assert_eq!(sync.progress(), 1.0);
    }

    #[test]
    fn test_zero_epsilon_still_settles() {
        for epsilon in [0.0, -1.0, f64::NAN] {
            let mut sync = ProgressSynchronizer::new(2.0, epsilon);
            let mut prev = sync.progress();
            let mut ticks = 0;
            while !sync.is_settled(MacroState::Assembled) {
                let next = sync.advance(MacroState::Assembled, DT);
                assert!(next > prev, "stalled at {next}");
                assert!(next <= 1.0);
                prev = next;
                ticks += 1;
                assert!(ticks < 2000, "did not settle with epsilon {epsilon}");
            }
            assert_eq!(sync.progress(), 1.0);
        }
    }

    #[test]
    fn test_zero_delta_does_not_snap() {
        let mut sync = ProgressSynchronizer::new(2.0, 0.0).starting_at(0.5);
        assert_eq!(sync.advance(MacroState::Assembled, 0.0), 0.5);
    }

    #[test]
    fn test_visible_transition_finishes_within_two_seconds() {
        let mut sync = ProgressSynchronizer::with_defaults().starting_at(1.0);
        let mut elapsed = 0.0;
        while sync.eased() > 0.01 {
            sync.advance(MacroState::Dispersed, DT);
            elapsed += DT;
        }
        assert!(elapsed > 0.5 && elapsed < 2.0, "elapsed {elapsed}");
    }

    #[test]
    fn test_frame_rate_independence() {
        let mut at_30 = ProgressSynchronizer::with_defaults();
        let mut at_120 = ProgressSynchronizer::with_defaults();
        for _ in 0..15 {
            at_30.advance(MacroState::Assembled, 1.0 / 30.0);
        }
        for _ in 0..60 {
            at_120.advance(MacroState::Assembled, 1.0 / 120.0);
        }
        assert!((at_30.progress() - at_120.progress()).abs() < 0.05);
    }

    #[test]
    fn test_fader_moves_at_its_own_rate() {
        let mut fast = VisibilityFader::new(0.0, 6.0);
        let mut slow = VisibilityFader::new(0.0, 3.0);
        fast.advance(true, DT);
        slow.advance(true, DT);
        assert!(fast.value() > slow.value());
        for _ in 0..600 {
            fast.advance(false, DT);
        }
        assert!(fast.value() < 1e-6);
    }
}
