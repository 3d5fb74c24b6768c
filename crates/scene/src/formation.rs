//! Subsystems that assemble with the shared formation progress.
//!
//! All three read `eased_progress` straight from the snapshot and never ease
//! it again, so they stay locked together on every tick.

use std::f64::consts::PI;

use tinsel_gesture_core::{approach, lerp, VisibilityFader};
use tinsel_hand_model::FrameSnapshot;

use crate::{AnimationSubsystem, SubsystemReport};

const FADE_RATE: f64 = 4.0;
const RIBBON_RATE: f64 = 3.0;
const RIBBON_SPIN: f64 = -0.2;
const RIBBON_MIN_PROGRESS: f64 = 0.1;
const RIBBON_SPIN_PROGRESS: f64 = 0.8;

pub const ORNAMENT_COUNT: usize = 50;
const CHAOS_RADIUS: f64 = 20.0;
const TREE_HEIGHT: f64 = 14.0;
const TREE_RADIUS: f64 = 5.5;
const TREE_BASE_Y: f64 = -5.0;

const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

pub type Point3 = [f64; 3];

/// The needle cloud.
pub struct FoliageField {
    formation: f64,
    scale: VisibilityFader,
}

impl FoliageField {
    pub fn new() -> Self {
        Self {
            formation: 0.0,
            scale: VisibilityFader::new(1.0, FADE_RATE),
        }
    }
}

impl Default for FoliageField {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationSubsystem for FoliageField {
    fn name(&self) -> &'static str {
        "foliage"
    }

    fn advance(&mut self, frame: &FrameSnapshot, dt: f64) {
        self.formation = frame.eased_progress;
        self.scale.advance(frame.macro_visible, dt);
    }

    fn report(&self) -> SubsystemReport {
        SubsystemReport {
            name: self.name(),
            formation: Some(self.formation),
            presence: self.scale.value(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Ornament {
    chaos: Point3,
    target: Point3,
}

/// Baubles that fly from a scattered sphere onto the tree cone.
pub struct OrnamentField {
    ornaments: Vec<Ornament>,
    positions: Vec<Point3>,
    formation: f64,
    scale: VisibilityFader,
}

impl OrnamentField {
    pub fn new(count: usize) -> Self {
        let ornaments: Vec<Ornament> = (0..count)
            .map(|i| Ornament {
                chaos: chaos_point(i, count, CHAOS_RADIUS),
                target: cone_point(i, count, TREE_HEIGHT, TREE_RADIUS, TREE_BASE_Y),
            })
            .collect();
        let positions = ornaments.iter().map(|o| o.chaos).collect();
        Self {
            ornaments,
            positions,
            formation: 0.0,
            scale: VisibilityFader::new(1.0, FADE_RATE),
        }
    }

    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.ornaments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ornaments.is_empty()
    }
}

impl Default for OrnamentField {
    fn default() -> Self {
        Self::new(ORNAMENT_COUNT)
    }
}

impl AnimationSubsystem for OrnamentField {
    fn name(&self) -> &'static str {
        "ornaments"
    }

    fn advance(&mut self, frame: &FrameSnapshot, dt: f64) {
        let t = frame.eased_progress;
        self.formation = t;
        for (position, ornament) in self.positions.iter_mut().zip(&self.ornaments) {
            for axis in 0..3 {
                position[axis] = lerp(ornament.chaos[axis], ornament.target[axis], t);
            }
        }
        self.scale.advance(frame.macro_visible, dt);
    }

    fn report(&self) -> SubsystemReport {
        SubsystemReport {
            name: self.name(),
            formation: Some(self.formation),
            presence: self.scale.value(),
        }
    }
}

/// The spiral ribbon wound around the tree.
pub struct RibbonStrip {
    formation: f64,
    width: f64,
    spin: f64,
}

impl RibbonStrip {
    pub fn new() -> Self {
        Self {
            formation: 0.0,
            width: 0.0,
            spin: 0.0,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Accumulated rotation about the vertical axis (rad).
    pub fn spin(&self) -> f64 {
        self.spin
    }
}

impl Default for RibbonStrip {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationSubsystem for RibbonStrip {
    fn name(&self) -> &'static str {
        "ribbon"
    }

    fn advance(&mut self, frame: &FrameSnapshot, dt: f64) {
        self.formation = frame.eased_progress;

        let shown = frame.macro_visible && frame.progress > RIBBON_MIN_PROGRESS;
        let target = if shown { frame.eased_progress } else { 0.0 };
        self.width = approach(self.width, target, RIBBON_RATE, dt);

        if frame.macro_visible && frame.progress > RIBBON_SPIN_PROGRESS {
            self.spin += RIBBON_SPIN * dt;
        }
    }

    fn report(&self) -> SubsystemReport {
        SubsystemReport {
            name: self.name(),
            formation: Some(self.formation),
            presence: self.width,
        }
    }
}

/// Fractional part of `i * phi`, a low-discrepancy sequence in `[0, 1)`.
fn weyl(i: usize, phi: f64) -> f64 {
    (i as f64 * phi).fract()
}

/// Deterministic point inside a ball, spread by a Fibonacci lattice.
fn chaos_point(i: usize, count: usize, radius: f64) -> Point3 {
    let n = count.max(1) as f64;
    let cos_phi = 1.0 - 2.0 * (i as f64 + 0.5) / n;
    let sin_phi = (1.0 - cos_phi * cos_phi).sqrt();
    let theta = GOLDEN_ANGLE * i as f64;
    let r = radius * weyl(i + 1, 0.754_877_666_246_692_7).cbrt();
    [
        r * sin_phi * theta.cos(),
        r * sin_phi * theta.sin(),
        r * cos_phi,
    ]
}

/// Deterministic point inside an upright cone, wide at the base.
fn cone_point(i: usize, count: usize, height: f64, radius: f64, base_y: f64) -> Point3 {
    let n = count.max(1) as f64;
    let level = (i as f64 + 0.5) / n;
    let ring = radius * (1.0 - level) * weyl(i + 1, 0.569_840_290_998_053_3).sqrt();
    let angle = (GOLDEN_ANGLE * i as f64) % (2.0 * PI);
    [
        ring * angle.cos(),
        level * height + base_y,
        ring * angle.sin(),
    ]
}
