//! Tinsel Gesture Core
//!
//! Turns noisy per-frame hand landmarks into stable intent, and intent into
//! one shared animation value:
//! - **Classifier:** geometric curl/pinch tests, one frame at a time
//! - **Stabilizer:** cursor low-pass filter plus run-length gesture debounce
//! - **Macro state:** palm disperses, fist assembles, everything else holds
//! - **Progress:** delta-time exponential approach and the shared ease curve
//!
//! This crate is pure computation with no I/O, clocks, or threads.
//! All inputs are data; all outputs are data.

pub mod classifier;
pub mod macro_state;
pub mod progress;
pub mod stabilizer;

pub use classifier::{classify, GestureClassifier};
pub use macro_state::{MacroStateController, MacroTransition};
pub use progress::{approach, ease_in_out_cubic, lerp, ProgressSynchronizer, VisibilityFader};
pub use stabilizer::{Observation, TemporalStabilizer};
