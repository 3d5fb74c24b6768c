//! Temporal stabilization of per-frame classifier output.
//!
//! Two filters run on every processed frame:
//! - **Position:** first-order low-pass, `s = s + α·(raw − s)` per axis.
//!   The time constant is tied to the (gated, roughly fixed) tracker rate,
//!   not to wall-clock deltas.
//! - **Gesture debounce:** a candidate is only reported once it has been seen
//!   on `debounce_frames` consecutive frames (default 2, about 60 ms).
//!
//! Losing the hand is never debounced: the absent state is reported on the
//! very next update.

use tinsel_common::config::TrackerConfig;
use tinsel_hand_model::{Gesture, HandState};

/// One frame's classifier output with the raw (unmirrored) palm position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub gesture: Gesture,
    pub raw_x: f64,
    pub raw_y: f64,
}

impl Observation {
    pub fn new(gesture: Gesture, raw_x: f64, raw_y: f64) -> Self {
        Self {
            gesture,
            raw_x,
            raw_y,
        }
    }
}

#[derive(Debug, Clone)]
struct StabilizerMemory {
    last_candidate: Gesture,
    run_length: u32,
    reported: Gesture,
    smoothed_x: f64,
    smoothed_y: f64,
}

impl Default for StabilizerMemory {
    fn default() -> Self {
        Self {
            last_candidate: Gesture::None,
            run_length: 0,
            reported: Gesture::None,
            smoothed_x: 0.5,
            smoothed_y: 0.5,
        }
    }
}

/// Owns the filter memory; produces one [`HandState`] per processed frame.
#[derive(Debug, Clone)]
pub struct TemporalStabilizer {
    alpha: f64,
    debounce_frames: u32,
    memory: StabilizerMemory,
}

impl TemporalStabilizer {
    pub fn new(alpha: f64, debounce_frames: u32) -> Self {
        Self {
            alpha: alpha.clamp(f64::EPSILON, 1.0),
            debounce_frames: debounce_frames.max(1),
            memory: StabilizerMemory::default(),
        }
    }

    /// α = 0.3, two-frame debounce.
    pub fn with_defaults() -> Self {
        Self::from_config(&TrackerConfig::default())
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.position_alpha, config.debounce_frames)
    }

    /// Feed one processed frame; `None` means no hand was tracked.
    pub fn update(&mut self, observation: Option<Observation>) -> HandState {
        match observation {
            Some(obs) => self.observe(obs),
            None => self.lose(),
        }
    }

    /// A hand was tracked this frame.
    pub fn observe(&mut self, obs: Observation) -> HandState {
        let m = &mut self.memory;

        m.smoothed_x += (obs.raw_x - m.smoothed_x) * self.alpha;
        m.smoothed_y += (obs.raw_y - m.smoothed_y) * self.alpha;

        if obs.gesture == m.last_candidate {
            m.run_length = m.run_length.saturating_add(1);
        } else {
            m.last_candidate = obs.gesture;
            m.run_length = 1;
        }

        if m.run_length >= self.debounce_frames && m.reported != obs.gesture {
            tracing::debug!(from = %m.reported, to = %obs.gesture, "Reported gesture changed");
            m.reported = obs.gesture;
        }

        HandState {
            present: true,
            x: 1.0 - m.smoothed_x,
            y: m.smoothed_y,
            gesture: m.reported,
        }
    }

    /// No hand this frame: break the current run and report absence at once.
    pub fn lose(&mut self) -> HandState {
        self.memory.run_length = 0;
        HandState::ABSENT
    }

    /// Gesture the debounce currently reports (kept across hand loss).
    pub fn reported_gesture(&self) -> Gesture {
        self.memory.reported
    }

    /// Smoothed palm position, unmirrored.
    pub fn smoothed_position(&self) -> (f64, f64) {
        (self.memory.smoothed_x, self.memory.smoothed_y)
    }

    /// Length of the current run of identical candidates.
    pub fn run_length(&self) -> u32 {
        self.memory.run_length
    }
}

impl Default for TemporalStabilizer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(gesture: Gesture) -> Option<Observation> {
        Some(Observation::new(gesture, 0.5, 0.5))
    }

    fn settled_on(gesture: Gesture) -> TemporalStabilizer {
        let mut stabilizer = TemporalStabilizer::with_defaults();
        stabilizer.update(obs(gesture));
        stabilizer.update(obs(gesture));
        assert_eq!(stabilizer.reported_gesture(), gesture);
        stabilizer
    }

    #[test]
    fn test_single_frame_spike_is_suppressed() {
        let mut stabilizer = settled_on(Gesture::OpenPalm);
        let spike = stabilizer.update(obs(Gesture::ClosedFist));
        assert_eq!(spike.gesture, Gesture::OpenPalm);
        let back = stabilizer.update(obs(Gesture::OpenPalm));
        assert_eq!(back.gesture, Gesture::OpenPalm);
    }

    #[test]
    fn test_two_frame_run_is_accepted() {
        let mut stabilizer = settled_on(Gesture::OpenPalm);
        assert_eq!(
            stabilizer.update(obs(Gesture::Victory)).gesture,
            Gesture::OpenPalm
        );
        assert_eq!(
            stabilizer.update(obs(Gesture::Victory)).gesture,
            Gesture::Victory
        );
    }

    #[test]
    fn test_loss_is_immediate_and_breaks_run() {
        let mut stabilizer = settled_on(Gesture::ClosedFist);
        let lost = stabilizer.update(None);
        assert_eq!(lost, HandState::ABSENT);
        assert_eq!(stabilizer.run_length(), 0);

        // the first frame back only restarts the run
        let back = stabilizer.update(obs(Gesture::OpenPalm));
        assert!(back.present);
        assert_eq!(back.gesture, Gesture::ClosedFist);
        assert_eq!(
            stabilizer.update(obs(Gesture::OpenPalm)).gesture,
            Gesture::OpenPalm
        );
    }

    #[test]
    fn test_position_low_pass_and_mirror() {
        let mut stabilizer = TemporalStabilizer::with_defaults();
        let state = stabilizer.update(Some(Observation::new(Gesture::None, 1.0, 0.0)));
        // smoothed = 0.5 + 0.3 * (raw - 0.5)
        assert!((stabilizer.smoothed_position().0 - 0.65).abs() < 1e-12);
        assert!((state.x - 0.35).abs() < 1e-12);
        assert!((state.y - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_position_converges_to_raw() {
        let mut stabilizer = TemporalStabilizer::with_defaults();
        let mut state = HandState::ABSENT;
        for _ in 0..60 {
            state = stabilizer.update(Some(Observation::new(Gesture::None, 0.2, 0.9)));
        }
        assert!((state.x - 0.8).abs() < 1e-6);
        assert!((state.y - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_longer_debounce_from_config() {
        let config = TrackerConfig {
            debounce_frames: 4,
            ..TrackerConfig::default()
        };
        let mut stabilizer = TemporalStabilizer::from_config(&config);
        for _ in 0..3 {
            assert_eq!(stabilizer.update(obs(Gesture::Victory)).gesture, Gesture::None);
        }
        assert_eq!(
            stabilizer.update(obs(Gesture::Victory)).gesture,
            Gesture::Victory
        );
    }
}
