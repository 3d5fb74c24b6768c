//! Single-frame gesture classification.
//!
//! # Algorithm
//!
//! 1. **Pinch:** thumb tip to index tip closer than the pinch threshold.
//!    Checked first; wins regardless of the other fingers.
//! 2. **Curl test** per finger: the fingertip is closer to the wrist than the
//!    finger's middle knuckle (PIP). Comparing radial distances instead of
//!    angles keeps the test independent of camera roll.
//! 3. **Pattern match** over `[index, middle, ring, pinky]` curls, in order:
//!    pointing-up, closed fist, victory, open palm. The thumb is ignored.
//!
//! Anything else is [`Gesture::None`].

use tinsel_common::config::TrackerConfig;
use tinsel_hand_model::{Finger, Gesture, LandmarkFrame, INDEX_TIP, THUMB_TIP};

/// Default pinch threshold in normalized frame units.
pub const DEFAULT_PINCH_THRESHOLD: f64 = 0.05;

/// Stateless gesture classifier.
#[derive(Debug, Clone, Copy)]
pub struct GestureClassifier {
    pinch_threshold: f64,
}

/// Curl state of the four non-thumb fingers (true = curled).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerCurls {
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerCurls {
    pub fn measure(frame: &LandmarkFrame) -> Self {
        Self {
            index: is_curled(frame, Finger::Index),
            middle: is_curled(frame, Finger::Middle),
            ring: is_curled(frame, Finger::Ring),
            pinky: is_curled(frame, Finger::Pinky),
        }
    }

    fn pattern(self) -> [bool; 4] {
        [self.index, self.middle, self.ring, self.pinky]
    }
}

impl GestureClassifier {
    pub fn new(pinch_threshold: f64) -> Self {
        Self { pinch_threshold }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_PINCH_THRESHOLD)
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.pinch_threshold)
    }

    pub fn pinch_threshold(&self) -> f64 {
        self.pinch_threshold
    }

    /// Classify one frame. Total: every frame maps to some gesture.
    pub fn classify(&self, frame: &LandmarkFrame) -> Gesture {
        if self.is_pinching(frame) {
            return Gesture::PinchHeart;
        }

        match FingerCurls::measure(frame).pattern() {
            [false, true, true, true] => Gesture::PointingUp,
            [true, true, true, true] => Gesture::ClosedFist,
            [false, false, true, true] => Gesture::Victory,
            [false, false, false, false] => Gesture::OpenPalm,
            _ => Gesture::None,
        }
    }

    /// Thumb tip within the pinch threshold of the index tip.
    pub fn is_pinching(&self, frame: &LandmarkFrame) -> bool {
        frame.joint(THUMB_TIP).distance_2d(frame.joint(INDEX_TIP)) < self.pinch_threshold
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Curl test for one finger.
pub fn is_curled(frame: &LandmarkFrame, finger: Finger) -> bool {
    frame.radial_distance(finger.tip()) < frame.radial_distance(finger.pip())
}

/// Classify with the default pinch threshold.
pub fn classify(frame: &LandmarkFrame) -> Gesture {
    GestureClassifier::with_defaults().classify(frame)
}
