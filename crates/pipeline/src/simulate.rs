//! Deterministic offline runs on a virtual clock.
//!
//! Frames are fed at their recorded timestamps and render ticks are
//! interleaved at the configured rate, so a recording always produces the
//! same timeline regardless of machine speed.

use serde::Serialize;

use tinsel_common::config::AppConfig;
use tinsel_common::error::{TinselError, TinselResult};
use tinsel_hand_model::recording::LandmarkRecord;
use tinsel_hand_model::{FrameSnapshot, Gesture, HandState, MacroState};
use tinsel_landmark_source::TrackedFrame;
use tinsel_scene::{SceneGraph, SubsystemReport};

use crate::director::FormationDirector;
use crate::processor::{FrameOutcome, FrameProcessor, ProcessorStats, TrackerSnapshot};

/// Render time allowed after the last frame for the formation to settle.
const SETTLE_SECS: f64 = 5.0;

/// Longest silence allowed between two consecutive records.
pub const MAX_RECORD_GAP_NS: u64 = 60 * 1_000_000_000;

/// One line of the timeline: what happened to one recorded frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub sequence: u64,
    pub t_ms: f64,
    pub outcome: &'static str,
    /// Raw classifier output for processed frames with a hand.
    pub candidate: Option<Gesture>,
    pub hand: HandState,
    pub macro_state: MacroState,
    pub progress: f64,
    pub eased_progress: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub timeline: Vec<TimelineEntry>,
    pub stats: ProcessorStats,
    pub render_ticks: u64,
    pub final_frame: FrameSnapshot,
    pub subsystems: Vec<SubsystemReport>,
}

/// Record times relative to the first record.
///
/// Rejects records that go back in time or leave a gap longer than
/// [`MAX_RECORD_GAP_NS`].
fn rebase_timestamps(records: &[LandmarkRecord]) -> TinselResult<Vec<u64>> {
    let Some(first) = records.first() else {
        return Ok(Vec::new());
    };
    let base_ns = first.timestamp_ns;
    let mut previous_ns = base_ns;

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let t = record.timestamp_ns;
            if t < previous_ns {
                return Err(TinselError::landmark(format!(
                    "record {}: timestamp {t} is before the previous record ({previous_ns})",
                    index + 1
                )));
            }
            if t - previous_ns > MAX_RECORD_GAP_NS {
                return Err(TinselError::landmark(format!(
                    "record {}: {:.1}s gap after the previous record",
                    index + 1,
                    (t - previous_ns) as f64 / 1e9
                )));
            }
            previous_ns = t;
            Ok(t - base_ns)
        })
        .collect()
}

/// The virtual-clock pipeline: tracker state, director and scene.
struct VirtualRun {
    processor: FrameProcessor,
    director: FormationDirector,
    scene: SceneGraph,
    tick_ns: u64,
    next_tick_ns: u64,
    tracker: TrackerSnapshot,
    frame: FrameSnapshot,
    timeline: Vec<TimelineEntry>,
}

impl VirtualRun {
    fn render_until(&mut self, until_ns: u64) {
        while self.next_tick_ns <= until_ns {
            let (snapshot, dt) = self.director.tick_at(&self.tracker, self.next_tick_ns);
            self.scene.broadcast(&snapshot, dt);
            self.frame = snapshot;
            self.next_tick_ns = self.next_tick_ns.saturating_add(self.tick_ns);
        }
    }

    /// Offer `tracked` at `now_ns` and log the outcome. Returns the frame back
    /// if the rate gate turned it away.
    fn offer(&mut self, tracked: TrackedFrame, now_ns: u64, late: bool) -> Option<TrackedFrame> {
        let sequence = tracked.sequence;
        let (label, candidate, held) = match self.processor.process(&tracked, now_ns) {
            FrameOutcome::Processed {
                candidate,
                snapshot,
            } => {
                self.tracker = snapshot;
                let label = if late { "processed_late" } else { "processed" };
                (label, candidate, None)
            }
            FrameOutcome::RateDropped => ("rate_dropped", None, Some(tracked)),
            FrameOutcome::Stale => ("stale", None, None),
        };

        self.timeline.push(TimelineEntry {
            sequence,
            t_ms: now_ns as f64 / 1_000_000.0,
            outcome: label,
            candidate,
            hand: self.tracker.hand,
            macro_state: self.tracker.macro_state,
            progress: self.frame.progress,
            eased_progress: self.frame.eased_progress,
        });
        held
    }

    /// Process a held frame at the moment the gate reopens, if that comes
    /// before `before_ns`.
    fn flush_held(&mut self, held: &mut Option<TrackedFrame>, before_ns: Option<u64>) {
        let reopens_ns = self.processor.gate_reopens_at_ns();
        if before_ns.is_some_and(|next| next <= reopens_ns) {
            return;
        }
        if let Some(frame) = held.take() {
            self.render_until(reopens_ns);
            *held = self.offer(frame, reopens_ns, true);
        }
    }
}

/// Run `records` through the full pipeline with the standard scene.
///
/// Record times are taken relative to the first record. A frame dropped by
/// the rate gate is processed when the gate reopens unless a newer record
/// arrives first, as in a live session.
pub fn simulate(config: &AppConfig, records: &[LandmarkRecord]) -> TinselResult<SimulationReport> {
    config.validate()?;
    let times = rebase_timestamps(records)?;

    let mut run = VirtualRun {
        processor: FrameProcessor::new(&config.tracker),
        director: FormationDirector::new(&config.render),
        scene: SceneGraph::standard(),
        tick_ns: 1_000_000_000 / config.render.tick_hz.max(1) as u64,
        next_tick_ns: 0,
        tracker: TrackerSnapshot::default(),
        frame: FrameSnapshot::default(),
        timeline: Vec::with_capacity(records.len()),
    };
    let mut held: Option<TrackedFrame> = None;

    for (index, (record, &now_ns)) in records.iter().zip(&times).enumerate() {
        run.flush_held(&mut held, Some(now_ns));
        run.render_until(now_ns);

        let tracked = TrackedFrame {
            sequence: index as u64 + 1,
            timestamp_ns: now_ns,
            hand: record.hand,
        };
        held = run.offer(tracked, now_ns, false);
    }
    run.flush_held(&mut held, None);

    let last_ns = times.last().copied().unwrap_or(0);
    let settle_ns = (SETTLE_SECS * 1_000_000_000.0) as u64;
    run.render_until(last_ns.max(run.next_tick_ns).saturating_add(settle_ns));

    tracing::debug!(
        frames = records.len(),
        ticks = run.director.ticks(),
        "Simulation finished"
    );

    Ok(SimulationReport {
        stats: run.processor.stats(),
        render_ticks: run.director.ticks(),
        final_frame: run.frame,
        subsystems: run.scene.reports(),
        timeline: run.timeline,
    })
}
