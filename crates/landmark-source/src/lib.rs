//! Tinsel Landmark Source
//!
//! The boundary between a hand tracker and the gesture pipeline. A source
//! hands back the newest landmark frame (or "no hand") when polled; the
//! pipeline never sees how the landmarks were produced.
//!
//! - **Backends:** scripted frames, paced JSONL replay, and an always-failing
//!   stand-in for a missing camera
//! - **Slot:** a single-slot, latest-wins frame holder between the capture
//!   pump and the tracker loop
//! - **Guard:** scoped acquisition so the capture resource is released on
//!   every exit path
//! - **Writer:** append-only JSONL recorder

pub mod backends;
pub mod slot;
pub mod writer;

use tinsel_common::error::{TinselError, TinselResult};
use tinsel_hand_model::LandmarkFrame;

pub use backends::{ReplaySource, ScriptStep, ScriptedSource, SourceLifecycle, UnavailableSource};
pub use slot::{LatestFrameReader, LatestFrameSlot};
pub use writer::LandmarkWriter;

/// One tracker callback as delivered by a source.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedFrame {
    /// Strictly increasing per source; used to detect stale re-deliveries.
    pub sequence: u64,

    /// Source timestamp (ns since the source was opened).
    pub timestamp_ns: u64,

    /// The tracked hand, or `None` if the tracker found no hand.
    pub hand: Option<LandmarkFrame>,
}

/// Trait for landmark source backends.
pub trait LandmarkSource: Send {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Acquire the underlying capture resource.
    fn open(&mut self) -> TinselResult<()>;

    /// Newest frame not yet delivered, given the session time.
    ///
    /// Returns `Ok(None)` while paused, after the source has ended, or when
    /// nothing new arrived. An `Err` concerns this poll only.
    fn poll(&mut self, now_ns: u64) -> TinselResult<Option<TrackedFrame>>;

    /// Release the capture resource. Must tolerate being called after a
    /// failed `open`.
    fn close(&mut self);

    /// Whether the source will never produce another frame.
    fn is_finished(&self) -> bool {
        false
    }
}

/// Holds an opened source and closes it when dropped.
pub struct SourceGuard {
    source: Box<dyn LandmarkSource>,
    released: bool,
}

impl SourceGuard {
    /// Open `source`. On failure the source is closed before the error is
    /// returned, so a half-initialised capture never leaks.
    pub fn acquire(mut source: Box<dyn LandmarkSource>) -> TinselResult<Self> {
        tracing::info!(source = %source.name(), "Opening landmark source");
        if let Err(e) = source.open() {
            source.close();
            return Err(match e {
                TinselError::Source { .. } => e,
                other => TinselError::source(format!("{}: {other}", source.name())),
            });
        }
        Ok(Self {
            source,
            released: false,
        })
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn poll(&mut self, now_ns: u64) -> TinselResult<Option<TrackedFrame>> {
        self.source.poll(now_ns)
    }

    pub fn is_finished(&self) -> bool {
        self.source.is_finished()
    }

    /// Close the source now instead of at drop.
    pub fn release(mut self) {
        self.close_once();
    }

    fn close_once(&mut self) {
        if !self.released {
            self.released = true;
            self.source.close();
            tracing::info!(source = %self.source.name(), "Landmark source released");
        }
    }
}

impl Drop for SourceGuard {
    fn drop(&mut self) {
        self.close_once();
    }
}
