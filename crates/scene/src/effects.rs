//! Gesture-triggered effects that take the stage from the tree.

use tinsel_gesture_core::approach;
use tinsel_hand_model::{FrameSnapshot, Gesture};

use crate::{AnimationSubsystem, SubsystemReport};

const HEARTBEAT_FREQ: f64 = 8.0;
const HEARTBEAT_DEPTH: f64 = 0.3;

const GLOW_PEAK: f64 = 5.0;
const GLOW_RATE: f64 = 6.0;

/// Heart shown while a pinch is held. Pops in and out with no easing.
pub struct HeartBurst {
    scale: f64,
}

impl HeartBurst {
    pub fn new() -> Self {
        Self { scale: 0.0 }
    }

    /// Pulse multiplier at `t` seconds: `sin²(8t)·0.3 + 1`.
    pub fn heartbeat(t: f64) -> f64 {
        let s = (t * HEARTBEAT_FREQ).sin();
        s * s * HEARTBEAT_DEPTH + 1.0
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Default for HeartBurst {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationSubsystem for HeartBurst {
    fn name(&self) -> &'static str {
        "heart"
    }

    fn advance(&mut self, frame: &FrameSnapshot, _dt: f64) {
        self.scale = if frame.hand.gesture == Gesture::PinchHeart {
            Self::heartbeat(frame.elapsed_secs)
        } else {
            0.0
        };
    }

    fn report(&self) -> SubsystemReport {
        SubsystemReport {
            name: self.name(),
            formation: None,
            presence: self.scale.min(1.0),
        }
    }
}

/// Spotlight that swells while the victory sign is held.
pub struct VictoryGlow {
    intensity: f64,
}

impl VictoryGlow {
    pub fn new() -> Self {
        Self { intensity: 0.0 }
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }
}

impl Default for VictoryGlow {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationSubsystem for VictoryGlow {
    fn name(&self) -> &'static str {
        "victory"
    }

    fn advance(&mut self, frame: &FrameSnapshot, dt: f64) {
        let target = if frame.hand.gesture == Gesture::Victory {
            GLOW_PEAK
        } else {
            0.0
        };
        self.intensity = approach(self.intensity, target, GLOW_RATE, dt);
    }

    fn report(&self) -> SubsystemReport {
        SubsystemReport {
            name: self.name(),
            formation: None,
            presence: self.intensity / GLOW_PEAK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinsel_hand_model::HandState;

    fn holding(gesture: Gesture, t: f64) -> FrameSnapshot {
        FrameSnapshot {
            elapsed_secs: t,
            hand: HandState {
                present: true,
                x: 0.5,
                y: 0.5,
                gesture,
            },
            macro_visible: tinsel_hand_model::macro_visible_for(gesture),
            ..FrameSnapshot::default()
        }
    }

    #[test]
    fn test_heart_pops_without_easing() {
        let mut heart = HeartBurst::new();
        heart.advance(&holding(Gesture::PinchHeart, 0.0), 0.016);
        assert_eq!(heart.scale(), 1.0);

        heart.advance(&holding(Gesture::OpenPalm, 0.1), 0.016);
        assert_eq!(heart.scale(), 0.0);
    }

    #[test]
    fn test_heartbeat_range() {
        for i in 0..200 {
            let beat = HeartBurst::heartbeat(i as f64 * 0.01);
            assert!((1.0..=1.3 + 1e-12).contains(&beat));
        }
    }

    #[test]
    fn test_glow_swells_and_fades() {
        let mut glow = VictoryGlow::new();
        for _ in 0..60 {
            glow.advance(&holding(Gesture::Victory, 0.0), 1.0 / 60.0);
        }
        assert!((glow.intensity() - GLOW_PEAK).abs() < 0.02);

        for _ in 0..60 {
            glow.advance(&holding(Gesture::None, 0.0), 1.0 / 60.0);
        }
        assert!(glow.intensity() < 0.02);
    }
}
