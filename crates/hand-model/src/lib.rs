//! Tinsel Hand Model
//!
//! Defines the data contracts shared by every Tinsel crate:
//! - **Landmarks:** one tracked hand as 21 normalized joints
//! - **Gestures:** the discrete poses the classifier can report
//! - **State:** the stabilized `HandState`, the `MacroState`, and the
//!   per-tick `FrameSnapshot` handed to animation subsystems
//! - **Recording:** the JSONL format used to replay landmark streams
//! - **Synthetic poses:** canonical hands for simulation and tests
//!
//! All coordinates are normalized to `[0.0, 1.0]` relative to the capture
//! frame, `(0, 0)` being top-left as seen by the camera (unmirrored).

pub mod gesture;
pub mod landmark;
pub mod recording;
pub mod state;
pub mod synthetic;

pub use gesture::*;
pub use landmark::*;
pub use recording::*;
pub use state::*;
pub use synthetic::synthesize_pose;
