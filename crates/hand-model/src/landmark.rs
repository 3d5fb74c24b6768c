//! Hand landmark types.
//!
//! A tracked hand is 21 joints in the usual hand-tracking order:
//! wrist, then four joints per digit from the base outward
//! (thumb 1-4, index 5-8, middle 9-12, ring 13-16, pinky 17-20).

use serde::{Deserialize, Serialize};

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// A single tracked joint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// Normalized X coordinate [0.0, 1.0].
    pub x: f64,
    /// Normalized Y coordinate [0.0, 1.0].
    pub y: f64,
    /// Relative depth, when the tracker provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn with_depth(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    /// Planar (x, y) Euclidean distance; depth is ignored.
    pub fn distance_2d(&self, other: &Landmark) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.map_or(true, f64::is_finite)
    }
}

/// The four non-thumb fingers the curl test looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    /// Joint index of the fingertip.
    pub fn tip(self) -> usize {
        match self {
            Finger::Index => INDEX_TIP,
            Finger::Middle => MIDDLE_TIP,
            Finger::Ring => RING_TIP,
            Finger::Pinky => PINKY_TIP,
        }
    }

    /// Joint index of the middle knuckle (PIP).
    pub fn pip(self) -> usize {
        match self {
            Finger::Index => INDEX_PIP,
            Finger::Middle => MIDDLE_PIP,
            Finger::Ring => RING_PIP,
            Finger::Pinky => PINKY_PIP,
        }
    }

    /// Joint index of the base knuckle (MCP).
    pub fn mcp(self) -> usize {
        match self {
            Finger::Index => INDEX_MCP,
            Finger::Middle => MIDDLE_MCP,
            Finger::Ring => RING_MCP,
            Finger::Pinky => PINKY_MCP,
        }
    }
}

/// Why a set of joints was rejected as a frame.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LandmarkFrameError {
    #[error("expected 21 landmarks, got {0}")]
    WrongCount(usize),

    #[error("landmark {0} has a non-finite coordinate")]
    NonFinite(usize),
}

/// One hand's joints for one tracker callback. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct LandmarkFrame {
    joints: [Landmark; LANDMARK_COUNT],
}

impl LandmarkFrame {
    /// Build a frame, checking joint count and coordinate sanity.
    pub fn new(joints: &[Landmark]) -> Result<Self, LandmarkFrameError> {
        if joints.len() != LANDMARK_COUNT {
            return Err(LandmarkFrameError::WrongCount(joints.len()));
        }
        if let Some(idx) = joints.iter().position(|j| !j.is_finite()) {
            return Err(LandmarkFrameError::NonFinite(idx));
        }
        let mut array = [Landmark::default(); LANDMARK_COUNT];
        array.copy_from_slice(joints);
        Ok(Self { joints: array })
    }

    pub fn from_array(joints: [Landmark; LANDMARK_COUNT]) -> Result<Self, LandmarkFrameError> {
        Self::new(&joints)
    }

    pub fn joint(&self, index: usize) -> &Landmark {
        &self.joints[index]
    }

    pub fn joints(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.joints
    }

    pub fn wrist(&self) -> &Landmark {
        &self.joints[WRIST]
    }

    /// Palm centre: midpoint of the wrist and the middle-finger base.
    /// This is the raw cursor position fed to the stabilizer.
    pub fn palm_center(&self) -> (f64, f64) {
        let wrist = &self.joints[WRIST];
        let middle_base = &self.joints[MIDDLE_MCP];
        ((wrist.x + middle_base.x) / 2.0, (wrist.y + middle_base.y) / 2.0)
    }

    /// Distance from the wrist to the given joint.
    pub fn radial_distance(&self, index: usize) -> f64 {
        self.joints[index].distance_2d(self.wrist())
    }
}

impl TryFrom<Vec<Landmark>> for LandmarkFrame {
    type Error = LandmarkFrameError;

    fn try_from(joints: Vec<Landmark>) -> Result<Self, Self::Error> {
        Self::new(&joints)
    }
}

impl From<LandmarkFrame> for Vec<Landmark> {
    fn from(frame: LandmarkFrame) -> Self {
        frame.joints.to_vec()
    }
}
