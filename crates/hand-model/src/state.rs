//! Stabilized state shared between the tracker and render sides.
//!
//! Every type here is `Copy`: consumers receive snapshots by value, so a
//! reader can never observe a half-written state.

use serde::{Deserialize, Serialize};

use crate::gesture::Gesture;

/// The stabilized hand as reported to the rest of the system.
///
/// `x` is mirrored (`1 - smoothed_x`) to match a mirrored presentation;
/// `y` is passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandState {
    pub present: bool,
    pub x: f64,
    pub y: f64,
    pub gesture: Gesture,
}

impl HandState {
    /// Reported whenever no hand is tracked.
    pub const ABSENT: HandState = HandState {
        present: false,
        x: 0.5,
        y: 0.5,
        gesture: Gesture::None,
    };

    /// True while a hand is present and holding `gesture`.
    pub fn is_holding(&self, gesture: Gesture) -> bool {
        self.present && self.gesture == gesture
    }
}

impl Default for HandState {
    fn default() -> Self {
        Self::ABSENT
    }
}

/// Coarse formation mode driven by palm/fist gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroState {
    /// Particles scattered.
    Dispersed,
    /// Particles gathered into the formation. Initial state.
    #[default]
    Assembled,
}

impl MacroState {
    /// Progress value this state pulls toward.
    pub fn target_progress(self) -> f64 {
        match self {
            MacroState::Assembled => 1.0,
            MacroState::Dispersed => 0.0,
        }
    }
}

/// Whether the main formation should be on stage for a reported gesture.
///
/// The love and wish effects take the stage while their gestures are held.
pub fn macro_visible_for(gesture: Gesture) -> bool {
    !matches!(gesture, Gesture::PinchHeart | Gesture::Victory)
}

/// The one authoritative per-tick view handed to every animation subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Render tick counter, starting at 0.
    pub tick: u64,
    /// Seconds since the render loop started.
    pub elapsed_secs: f64,
    /// Raw (linear) formation progress in `[0, 1]`.
    pub progress: f64,
    /// `progress` after the shared ease-in-out curve.
    pub eased_progress: f64,
    pub hand: HandState,
    pub macro_state: MacroState,
    pub macro_visible: bool,
}

impl Default for FrameSnapshot {
    fn default() -> Self {
        Self {
            tick: 0,
            elapsed_secs: 0.0,
            progress: 0.0,
            eased_progress: 0.0,
            hand: HandState::ABSENT,
            macro_state: MacroState::default(),
            macro_visible: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_hand_is_centered() {
        let hand = HandState::default();
        assert!(!hand.present);
        assert_eq!((hand.x, hand.y), (0.5, 0.5));
        assert_eq!(hand.gesture, Gesture::None);
    }

    #[test]
    fn test_macro_targets() {
        assert_eq!(MacroState::default(), MacroState::Assembled);
        assert_eq!(MacroState::Assembled.target_progress(), 1.0);
        assert_eq!(MacroState::Dispersed.target_progress(), 0.0);
    }

    #[test]
    fn test_macro_visibility_yields_to_effects() {
        assert!(!macro_visible_for(Gesture::PinchHeart));
        assert!(!macro_visible_for(Gesture::Victory));
        assert!(macro_visible_for(Gesture::OpenPalm));
        assert!(macro_visible_for(Gesture::None));
    }

    #[test]
    fn test_is_holding_requires_presence() {
        let mut hand = HandState {
            present: true,
            x: 0.3,
            y: 0.3,
            gesture: Gesture::PointingUp,
        };
        assert!(hand.is_holding(Gesture::PointingUp));
        hand.present = false;
        assert!(!hand.is_holding(Gesture::PointingUp));
    }
}
