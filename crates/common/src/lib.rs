//! Tinsel Common Utilities
//!
//! Shared infrastructure for all Tinsel crates:
//! - Error types and result aliases
//! - Clocks, tick deltas, and frame-rate gating
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
