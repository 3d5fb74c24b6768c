//! Canonical synthetic hands.
//!
//! Builds an upright, camera-facing hand whose finger curls spell out a
//! requested gesture. Used by the simulator, the `synth` command, and tests.

use crate::gesture::Gesture;
use crate::landmark::{Finger, Landmark, LandmarkFrame, LANDMARK_COUNT, THUMB_TIP, WRIST};

/// Horizontal offset of each finger's column from the palm centre.
fn column(finger: Finger) -> f64 {
    match finger {
        Finger::Index => -0.03,
        Finger::Middle => 0.0,
        Finger::Ring => 0.03,
        Finger::Pinky => 0.06,
    }
}

/// Finger states `[index, middle, ring, pinky]` (true = curled) for a gesture.
fn curls(gesture: Gesture) -> [bool; 4] {
    match gesture {
        Gesture::OpenPalm => [false, false, false, false],
        Gesture::ClosedFist => [true, true, true, true],
        Gesture::Victory => [false, false, true, true],
        Gesture::PointingUp => [false, true, true, true],
        Gesture::PinchHeart => [false, false, false, false],
        // index down, middle up, ring down, pinky up: matches nothing
        Gesture::None => [true, false, true, false],
    }
}

/// Synthesize a frame that classifies as `gesture`, with the middle-finger
/// base at `(cx, cy)`.
pub fn synthesize_pose(gesture: Gesture, cx: f64, cy: f64) -> LandmarkFrame {
    let mut joints = [Landmark::default(); LANDMARK_COUNT];
    joints[WRIST] = Landmark::new(cx, cy + 0.15);

    // thumb, tucked out to the side
    joints[1] = Landmark::new(cx - 0.06, cy + 0.12);
    joints[2] = Landmark::new(cx - 0.09, cy + 0.08);
    joints[3] = Landmark::new(cx - 0.11, cy + 0.05);
    joints[THUMB_TIP] = Landmark::new(cx - 0.13, cy + 0.02);

    for (finger, curled) in Finger::ALL.into_iter().zip(curls(gesture)) {
        let x = cx + column(finger);
        let mcp = finger.mcp();
        joints[mcp] = Landmark::new(x, cy);
        if curled {
            joints[mcp + 1] = Landmark::new(x, cy - 0.04);
            joints[mcp + 2] = Landmark::new(x, cy - 0.01);
            joints[mcp + 3] = Landmark::new(x, cy + 0.03);
        } else {
            joints[mcp + 1] = Landmark::new(x, cy - 0.05);
            joints[mcp + 2] = Landmark::new(x, cy - 0.08);
            joints[mcp + 3] = Landmark::new(x, cy - 0.11);
        }
    }

    if gesture == Gesture::PinchHeart {
        let index_tip = joints[Finger::Index.tip()];
        joints[THUMB_TIP] = Landmark::new(index_tip.x - 0.01, index_tip.y + 0.01);
    }

    // Every coordinate above is finite and the array has 21 entries.
    match LandmarkFrame::from_array(joints) {
        Ok(frame) => frame,
        Err(e) => unreachable!("synthetic pose is always well-formed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palm_center_tracks_requested_position() {
        let frame = synthesize_pose(Gesture::OpenPalm, 0.4, 0.5);
        let (x, y) = frame.palm_center();
        assert!((x - 0.4).abs() < 1e-12);
        assert!((y - 0.575).abs() < 1e-12);
    }

    #[test]
    fn test_curled_tip_is_closer_to_wrist_than_pip() {
        let fist = synthesize_pose(Gesture::ClosedFist, 0.5, 0.5);
        for finger in Finger::ALL {
            assert!(fist.radial_distance(finger.tip()) < fist.radial_distance(finger.pip()));
        }
    }

    #[test]
    fn test_pinch_brings_thumb_to_index() {
        let pinch = synthesize_pose(Gesture::PinchHeart, 0.5, 0.5);
        let gap = pinch
            .joint(THUMB_TIP)
            .distance_2d(pinch.joint(Finger::Index.tip()));
        assert!(gap < 0.05);
    }
}
