//! Tinsel Scene
//!
//! Headless animation subsystems. Every render tick the scene graph hands
//! the same immutable [`FrameSnapshot`] to each subsystem; subsystems never
//! write back to it and never talk to each other.
//!
//! ```text
//!                    ┌── FoliageField   (formation, fade)
//!                    ├── OrnamentField  (formation, fade)
//! FrameSnapshot ─────┼── RibbonStrip    (formation, width, spin)
//!                    ├── TreeRig        (presence, yaw)
//!                    ├── HeartBurst     (pinch-heart effect)
//!                    └── VictoryGlow    (victory spotlight)
//! ```

pub mod effects;
pub mod formation;
pub mod graph;
pub mod rig;

use serde::Serialize;
use tinsel_hand_model::FrameSnapshot;

pub use effects::{HeartBurst, VictoryGlow};
pub use formation::{FoliageField, OrnamentField, RibbonStrip};
pub use graph::SceneGraph;
pub use rig::TreeRig;

/// A per-tick consumer of frame snapshots.
pub trait AnimationSubsystem: Send {
    fn name(&self) -> &'static str;

    /// Advance by `dt` seconds using this tick's snapshot.
    fn advance(&mut self, frame: &FrameSnapshot, dt: f64);

    fn report(&self) -> SubsystemReport;
}

/// What a subsystem currently shows, for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubsystemReport {
    pub name: &'static str,

    /// Formation fraction in `[0, 1]` for subsystems that assemble with the
    /// shared progress; `None` for the rest.
    pub formation: Option<f64>,

    /// How much of the subsystem is on stage, `0.0` hidden.
    pub presence: f64,
}
