//! The tree's trunk and inner core, and the yaw of the whole tree group.

use std::f64::consts::PI;

use tinsel_gesture_core::{approach, lerp};
use tinsel_hand_model::{FrameSnapshot, Gesture, MacroState};

use crate::{AnimationSubsystem, SubsystemReport};

const PRESENCE_RATE: f64 = 6.0;
const STEER_RATE: f64 = 5.0;
const IDLE_SPIN: f64 = 0.3;
const MIN_PROGRESS: f64 = 0.1;

const TRUNK_HIDDEN_Y: f64 = -6.0;
const TRUNK_SHOWN_Y: f64 = -2.0;

/// Trunk/core presence plus hand-steered yaw.
///
/// Pointing up turns the tree to follow the hand: the horizontal position
/// maps to two full turns across the frame. Otherwise an assembled tree
/// idles slowly.
pub struct TreeRig {
    presence: f64,
    trunk_y: f64,
    yaw: f64,
}

impl TreeRig {
    pub fn new() -> Self {
        Self {
            presence: 0.0,
            trunk_y: TRUNK_HIDDEN_Y,
            yaw: 0.0,
        }
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn trunk_y(&self) -> f64 {
        self.trunk_y
    }

    /// Yaw the tree turns toward for a hand at horizontal position `x`.
    pub fn steer_target(x: f64) -> f64 {
        (x - 0.5) * 4.0 * PI
    }
}

impl Default for TreeRig {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationSubsystem for TreeRig {
    fn name(&self) -> &'static str {
        "tree-rig"
    }

    fn advance(&mut self, frame: &FrameSnapshot, dt: f64) {
        let assembled = frame.macro_state == MacroState::Assembled;

        if frame.hand.is_holding(Gesture::PointingUp) {
            self.yaw = approach(self.yaw, Self::steer_target(frame.hand.x), STEER_RATE, dt);
        } else if assembled {
            self.yaw += IDLE_SPIN * dt;
        }

        let shown = frame.macro_visible && assembled && frame.progress > MIN_PROGRESS;
        let target = if shown { 1.0 } else { 0.0 };
        self.presence = approach(self.presence, target, PRESENCE_RATE, dt);

        let trunk_target = lerp(TRUNK_HIDDEN_Y, TRUNK_SHOWN_Y, target);
        self.trunk_y = approach(self.trunk_y, trunk_target, PRESENCE_RATE, dt);
    }

    fn report(&self) -> SubsystemReport {
        SubsystemReport {
            name: self.name(),
            formation: None,
            presence: self.presence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinsel_hand_model::HandState;

    fn pointing_at(x: f64) -> FrameSnapshot {
        FrameSnapshot {
            progress: 1.0,
            eased_progress: 1.0,
            hand: HandState {
                present: true,
                x,
                y: 0.5,
                gesture: Gesture::PointingUp,
            },
            ..FrameSnapshot::default()
        }
    }

    #[test]
    fn test_pointing_steers_toward_hand() {
        let mut rig = TreeRig::new();
        for _ in 0..120 {
            rig.advance(&pointing_at(0.75), 1.0 / 60.0);
        }
        assert!((rig.yaw() - PI).abs() < 1e-3);
    }

    #[test]
    fn test_idle_spin_when_assembled() {
        let mut rig = TreeRig::new();
        let frame = FrameSnapshot {
            progress: 1.0,
            eased_progress: 1.0,
            ..FrameSnapshot::default()
        };
        rig.advance(&frame, 0.5);
        assert!((rig.yaw() - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_dispersed_tree_neither_spins_nor_shows() {
        let mut rig = TreeRig::new();
        let frame = FrameSnapshot {
            macro_state: MacroState::Dispersed,
            progress: 0.5,
            eased_progress: 0.5,
            ..FrameSnapshot::default()
        };
        for _ in 0..30 {
            rig.advance(&frame, 1.0 / 30.0);
        }
        assert_eq!(rig.yaw(), 0.0);
        assert_eq!(rig.report().presence, 0.0);
        assert_eq!(rig.trunk_y(), TRUNK_HIDDEN_Y);
    }

    #[test]
    fn test_trunk_rises_with_presence() {
        let mut rig = TreeRig::new();
        let frame = FrameSnapshot {
            progress: 0.5,
            eased_progress: 0.5,
            ..FrameSnapshot::default()
        };
        for _ in 0..120 {
            rig.advance(&frame, 1.0 / 60.0);
        }
        assert!(rig.report().presence > 0.99);
        assert!((rig.trunk_y() - TRUNK_SHOWN_Y).abs() < 0.01);
    }
}
