//! Synchronous core of the tracker loop.

use std::time::Duration;

use serde::Serialize;
use tinsel_common::clock::RateController;
use tinsel_common::config::TrackerConfig;
use tinsel_gesture_core::{GestureClassifier, MacroStateController, Observation, TemporalStabilizer};
use tinsel_hand_model::{Gesture, HandState, MacroState};
use tinsel_landmark_source::TrackedFrame;

/// What the tracker side publishes after each processed frame.
///
/// Always replaced as a whole so a reader never sees a hand state from one
/// frame next to a macro state from another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackerSnapshot {
    pub hand: HandState,
    pub macro_state: MacroState,
    /// Sequence of the source frame this snapshot was derived from; 0 before
    /// any frame was processed.
    pub sequence: u64,
}

impl Default for TrackerSnapshot {
    fn default() -> Self {
        Self {
            hand: HandState::ABSENT,
            macro_state: MacroState::default(),
            sequence: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessorStats {
    pub processed: u64,
    pub rate_dropped: u64,
    pub stale_skipped: u64,
}

/// Result of offering one frame to the processor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    Processed {
        /// Raw classifier output, `None` when no hand was tracked.
        candidate: Option<Gesture>,
        snapshot: TrackerSnapshot,
    },
    /// Arrived sooner than the minimum interval after the last processed one.
    RateDropped,
    /// Same or older sequence than the last processed frame.
    Stale,
}

impl FrameOutcome {
    pub fn snapshot(&self) -> Option<TrackerSnapshot> {
        match self {
            Self::Processed { snapshot, .. } => Some(*snapshot),
            _ => None,
        }
    }
}

/// Classify → stabilize → macro state, one gated frame at a time.
pub struct FrameProcessor {
    classifier: GestureClassifier,
    stabilizer: TemporalStabilizer,
    macro_state: MacroStateController,
    gate: RateController,
    last_sequence: Option<u64>,
    snapshot: TrackerSnapshot,
    stats: ProcessorStats,
}

impl FrameProcessor {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            classifier: GestureClassifier::from_config(config),
            stabilizer: TemporalStabilizer::from_config(config),
            macro_state: MacroStateController::new(),
            gate: RateController::with_min_interval(Duration::from_millis(
                config.min_frame_interval_ms,
            )),
            last_sequence: None,
            snapshot: TrackerSnapshot::default(),
            stats: ProcessorStats::default(),
        }
    }

    /// Offer a frame that reached the tracker at `now_ns`.
    pub fn process(&mut self, frame: &TrackedFrame, now_ns: u64) -> FrameOutcome {
        // Stale frames must not consume the gate.
        if self.last_sequence.is_some_and(|last| frame.sequence <= last) {
            self.stats.stale_skipped += 1;
            tracing::trace!(sequence = frame.sequence, "Skipping stale frame");
            return FrameOutcome::Stale;
        }
        if !self.gate.should_tick(now_ns) {
            self.stats.rate_dropped += 1;
            return FrameOutcome::RateDropped;
        }
        self.last_sequence = Some(frame.sequence);

        let observation = frame.hand.as_ref().map(|hand| {
            let (x, y) = hand.palm_center();
            Observation::new(self.classifier.classify(hand), x, y)
        });
        let candidate = observation.map(|obs| obs.gesture);

        let hand = self.stabilizer.update(observation);
        self.macro_state.apply(&hand);

        self.snapshot = TrackerSnapshot {
            hand,
            macro_state: self.macro_state.state(),
            sequence: frame.sequence,
        };
        self.stats.processed += 1;

        FrameOutcome::Processed {
            candidate,
            snapshot: self.snapshot,
        }
    }

    /// When a frame dropped by the rate gate may be offered again.
    pub fn gate_reopens_at_ns(&self) -> u64 {
        self.gate.next_tick_ns().unwrap_or(0)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> TrackerSnapshot {
        self.snapshot
    }

    pub fn stats(&self) -> ProcessorStats {
        self.stats
    }
}

impl Default for FrameProcessor {
    fn default() -> Self {
        Self::new(&TrackerConfig::default())
    }
}
