//! Tinsel Pipeline
//!
//! Runs the two cadences of a gesture session and the glue between them:
//!
//! ```text
//! LandmarkSource ──pump──> LatestFrameSlot ──tracker──> TrackerSnapshot (watch)
//!                                                            │
//!                                  render tick ──────────────┤
//!                                                            ▼
//!                            FormationDirector ──> FrameSnapshot ──> SceneGraph
//! ```
//!
//! The tracker side classifies and stabilizes at most one frame per gate
//! interval. The render side copies the newest tracker snapshot on every
//! tick and never blocks on the tracker.

pub mod director;
pub mod processor;
pub mod session;
pub mod simulate;

pub use director::FormationDirector;
pub use processor::{FrameOutcome, FrameProcessor, ProcessorStats, TrackerSnapshot};
pub use session::{GestureSession, SessionStartReport, SessionState, SessionSummary};
pub use simulate::{simulate, SimulationReport, TimelineEntry};
