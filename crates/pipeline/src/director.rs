//! Turns tracker snapshots into per-tick frame snapshots.

use tinsel_common::clock::TickClock;
use tinsel_common::config::RenderConfig;
use tinsel_gesture_core::ProgressSynchronizer;
use tinsel_hand_model::{macro_visible_for, FrameSnapshot};

use crate::processor::TrackerSnapshot;

/// Owns the shared formation progress and stamps each render tick.
pub struct FormationDirector {
    progress: ProgressSynchronizer,
    clock: TickClock,
    tick: u64,
    elapsed_secs: f64,
}

impl FormationDirector {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            progress: ProgressSynchronizer::from_config(config),
            clock: TickClock::new(),
            tick: 0,
            elapsed_secs: 0.0,
        }
    }

    /// Render tick at session time `now_ns`. Returns the snapshot and the
    /// clamped delta it was advanced by.
    pub fn tick_at(&mut self, tracker: &TrackerSnapshot, now_ns: u64) -> (FrameSnapshot, f64) {
        let dt = self.clock.delta_secs(now_ns);
        (self.advance(tracker, dt), dt)
    }

    /// Render tick of exactly `dt` seconds.
    pub fn advance(&mut self, tracker: &TrackerSnapshot, dt: f64) -> FrameSnapshot {
        self.progress.advance(tracker.macro_state, dt);
        self.elapsed_secs += dt;

        let frame = FrameSnapshot {
            tick: self.tick,
            elapsed_secs: self.elapsed_secs,
            progress: self.progress.progress(),
            eased_progress: self.progress.eased(),
            hand: tracker.hand,
            macro_state: tracker.macro_state,
            macro_visible: macro_visible_for(tracker.hand.gesture),
        };
        self.tick += 1;
        frame
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn is_settled(&self, tracker: &TrackerSnapshot) -> bool {
        self.progress.is_settled(tracker.macro_state)
    }
}

impl Default for FormationDirector {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinsel_gesture_core::ease_in_out_cubic;
    use tinsel_hand_model::{Gesture, HandState, MacroState};

    #[test]
    fn test_first_tick_has_zero_delta() {
        let mut director = FormationDirector::default();
        let (frame, dt) = director.tick_at(&TrackerSnapshot::default(), 5_000_000_000);
        assert_eq!(dt, 0.0);
        assert_eq!(frame.tick, 0);
        assert_eq!(frame.progress, 0.0);
    }

    #[test]
    fn test_stalled_render_loop_is_clamped() {
        let mut director = FormationDirector::default();
        director.tick_at(&TrackerSnapshot::default(), 0);
        let (frame, dt) = director.tick_at(&TrackerSnapshot::default(), 10_000_000_000);
        assert_eq!(dt, 0.25);
        assert!((frame.progress - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_eased_value_matches_shared_curve() {
        let mut director = FormationDirector::default();
        for _ in 0..10 {
            let frame = director.advance(&TrackerSnapshot::default(), 1.0 / 60.0);
            assert_eq!(
                frame.eased_progress.to_bits(),
                ease_in_out_cubic(frame.progress).to_bits()
            );
        }
    }

    #[test]
    fn test_effect_gestures_hide_the_tree() {
        let mut director = FormationDirector::default();
        let tracker = TrackerSnapshot {
            hand: HandState {
                present: true,
                x: 0.5,
                y: 0.5,
                gesture: Gesture::Victory,
            },
            macro_state: MacroState::Assembled,
            sequence: 1,
        };
        assert!(!director.advance(&tracker, 0.016).macro_visible);
        assert!(director.advance(&TrackerSnapshot::default(), 0.016).macro_visible);
    }
}
