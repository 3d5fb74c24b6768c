//! Single-slot, latest-wins frame holder.
//!
//! The capture side overwrites the slot; the tracker side takes whatever is
//! newest. A frame that is overwritten before it is read is simply lost.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::TrackedFrame;

#[derive(Debug, Default)]
struct SlotCounters {
    published: AtomicU64,
    taken: AtomicU64,
}

/// Writer half of the slot.
pub struct LatestFrameSlot {
    tx: watch::Sender<Option<TrackedFrame>>,
    counters: Arc<SlotCounters>,
}

/// Reader half of the slot.
pub struct LatestFrameReader {
    rx: watch::Receiver<Option<TrackedFrame>>,
    counters: Arc<SlotCounters>,
}

impl LatestFrameSlot {
    pub fn new() -> (Self, LatestFrameReader) {
        let (tx, rx) = watch::channel(None);
        let counters = Arc::new(SlotCounters::default());
        (
            Self {
                tx,
                counters: counters.clone(),
            },
            LatestFrameReader { rx, counters },
        )
    }

    /// Replace the slot contents. Never blocks and never fails, even if the
    /// reader is gone.
    pub fn publish(&self, frame: TrackedFrame) {
        self.tx.send_replace(Some(frame));
        self.counters.published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn published(&self) -> u64 {
        self.counters.published.load(Ordering::Relaxed)
    }
}

impl LatestFrameReader {
    /// Wait for a frame newer than the last one taken. Returns `None` once
    /// the writer half has been dropped.
    pub async fn next(&mut self) -> Option<TrackedFrame> {
        loop {
            self.rx.changed().await.ok()?;
            if let Some(frame) = self.rx.borrow_and_update().clone() {
                self.counters.taken.fetch_add(1, Ordering::Relaxed);
                return Some(frame);
            }
        }
    }

    /// Frames that were overwritten before the reader saw them.
    pub fn overwritten(&self) -> u64 {
        let published = self.counters.published.load(Ordering::Relaxed);
        let taken = self.counters.taken.load(Ordering::Relaxed);
        published.saturating_sub(taken)
    }
}
