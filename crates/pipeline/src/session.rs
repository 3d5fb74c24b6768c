//! Gesture session management.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use tinsel_common::clock::SessionClock;
use tinsel_common::config::AppConfig;
use tinsel_common::error::{TinselError, TinselResult};
use tinsel_hand_model::FrameSnapshot;
use tinsel_landmark_source::{
    LandmarkSource, LatestFrameReader, LatestFrameSlot, SourceGuard, TrackedFrame,
};
use tinsel_scene::{SceneGraph, SubsystemReport};

use crate::director::FormationDirector;
use crate::processor::{FrameOutcome, FrameProcessor, ProcessorStats, TrackerSnapshot};

/// How often the pump asks the source for a new frame.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// State of a gesture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    /// Created but not started.
    Idle,
    /// Source acquired; both loops running.
    Running,
    /// Source could not be acquired; rendering continues with no hand.
    Degraded,
    Stopped,
}

/// Outcome of [`GestureSession::start`]. A missing source is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStartReport {
    Started { source: String },
    Degraded { reason: String },
}

impl SessionStartReport {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Counters and final state collected when a session stops.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    /// Wall-clock start time (RFC 3339).
    pub started_at: String,
    pub degraded: bool,
    /// The source failed for good while running.
    pub source_lost: bool,
    pub duration_secs: f64,
    pub frames_published: u64,
    /// Frames replaced in the slot before the tracker took them.
    pub frames_overwritten: u64,
    pub source_faults: u64,
    pub tracker: ProcessorStats,
    pub render_ticks: u64,
    pub final_frame: FrameSnapshot,
    pub subsystems: Vec<SubsystemReport>,
}

#[derive(Debug, Default)]
struct PumpReport {
    published: u64,
    faults: u64,
    lost: bool,
}

#[derive(Debug, Default)]
struct TrackerReport {
    stats: ProcessorStats,
    overwritten: u64,
}

#[derive(Debug, Default)]
struct RenderReport {
    ticks: u64,
    final_frame: FrameSnapshot,
    subsystems: Vec<SubsystemReport>,
}

/// A running pairing of one landmark source with one scene.
pub struct GestureSession {
    config: AppConfig,
    poll_interval: Duration,
    state: SessionState,
    source: Option<Box<dyn LandmarkSource>>,
    scene: Option<SceneGraph>,
    stop_flag: Arc<AtomicBool>,
    source_finished: Arc<AtomicBool>,
    started_at: Option<Instant>,
    started_wall: String,
    tracker_tx: Option<watch::Sender<TrackerSnapshot>>,
    tracker_rx: watch::Receiver<TrackerSnapshot>,
    frame_tx: Option<watch::Sender<FrameSnapshot>>,
    frame_rx: watch::Receiver<FrameSnapshot>,
    pump_task: Option<JoinHandle<PumpReport>>,
    tracker_task: Option<JoinHandle<TrackerReport>>,
    render_task: Option<JoinHandle<RenderReport>>,
}

impl GestureSession {
    /// Create a session over `source` with the standard scene.
    pub fn new(config: AppConfig, source: Box<dyn LandmarkSource>) -> Self {
        let (tracker_tx, tracker_rx) = watch::channel(TrackerSnapshot::default());
        let (frame_tx, frame_rx) = watch::channel(FrameSnapshot::default());
        Self {
            config,
            poll_interval: DEFAULT_POLL_INTERVAL,
            state: SessionState::Idle,
            source: Some(source),
            scene: Some(SceneGraph::standard()),
            stop_flag: Arc::new(AtomicBool::new(false)),
            source_finished: Arc::new(AtomicBool::new(false)),
            started_at: None,
            started_wall: String::new(),
            tracker_tx: Some(tracker_tx),
            tracker_rx,
            frame_tx: Some(frame_tx),
            frame_rx,
            pump_task: None,
            tracker_task: None,
            render_task: None,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_scene(mut self, scene: SceneGraph) -> Self {
        self.scene = Some(scene);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Acquire the source and start the pump, tracker, and render loops.
    ///
    /// If the source cannot be opened the session still starts, in
    /// [`SessionState::Degraded`], publishing the absent hand.
    pub async fn start(&mut self) -> TinselResult<SessionStartReport> {
        if self.state != SessionState::Idle {
            return Err(TinselError::session("Session already started"));
        }
        self.config.validate()?;

        let (Some(source), Some(scene), Some(tracker_tx), Some(frame_tx)) = (
            self.source.take(),
            self.scene.take(),
            self.tracker_tx.take(),
            self.frame_tx.take(),
        ) else {
            return Err(TinselError::session("Session resources already consumed"));
        };

        let clock = SessionClock::start();
        let epoch = Instant::now();
        tracing::info!(
            source = %source.name(),
            epoch_wall = %clock.epoch_wall(),
            "Starting gesture session"
        );

        let report = match SourceGuard::acquire(source) {
            Ok(guard) => {
                let name = guard.name().to_string();
                let (slot, reader) = LatestFrameSlot::new();

                self.pump_task = Some(tokio::spawn(pump_source(
                    guard,
                    slot,
                    epoch,
                    self.poll_interval,
                    self.stop_flag.clone(),
                    self.source_finished.clone(),
                )));
                self.tracker_task = Some(tokio::spawn(run_tracker(
                    reader,
                    FrameProcessor::new(&self.config.tracker),
                    epoch,
                    tracker_tx,
                )));
                self.state = SessionState::Running;
                SessionStartReport::Started { source: name }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Landmark source unavailable, running without hand input");
                tracker_tx.send_replace(TrackerSnapshot::default());
                self.source_finished.store(true, Ordering::SeqCst);
                self.state = SessionState::Degraded;
                SessionStartReport::Degraded {
                    reason: e.to_string(),
                }
            }
        };

        self.render_task = Some(tokio::spawn(run_render(
            scene,
            FormationDirector::new(&self.config.render),
            self.config.render.tick_hz,
            epoch,
            self.tracker_rx.clone(),
            frame_tx,
            self.stop_flag.clone(),
        )));

        self.started_at = Some(epoch);
        self.started_wall = clock.epoch_wall().to_string();
        tracing::info!(state = ?self.state, "Gesture session started");
        Ok(report)
    }

    /// Stop all loops, release the source, and collect the summary.
    pub async fn stop(&mut self) -> TinselResult<SessionSummary> {
        if !matches!(self.state, SessionState::Running | SessionState::Degraded) {
            return Err(TinselError::session("Session not running"));
        }

        tracing::info!("Stopping gesture session");
        self.stop_flag.store(true, Ordering::SeqCst);

        let pump = join_task(self.pump_task.take(), "source pump").await;
        let tracker = join_task(self.tracker_task.take(), "tracker").await;
        let render = join_task(self.render_task.take(), "render").await;

        let summary = SessionSummary {
            started_at: self.started_wall.clone(),
            degraded: self.state == SessionState::Degraded,
            source_lost: pump.lost,
            duration_secs: self
                .started_at
                .map(|t| t.elapsed().as_secs_f64())
                .unwrap_or(0.0),
            frames_published: pump.published,
            frames_overwritten: tracker.overwritten,
            source_faults: pump.faults,
            tracker: tracker.stats,
            render_ticks: render.ticks,
            final_frame: render.final_frame,
            subsystems: render.subsystems,
        };

        self.state = SessionState::Stopped;
        tracing::info!(
            duration_secs = summary.duration_secs,
            processed = summary.tracker.processed,
            render_ticks = summary.render_ticks,
            "Gesture session stopped"
        );
        Ok(summary)
    }

    /// Newest frame snapshot produced by the render loop.
    pub fn latest_frame(&self) -> FrameSnapshot {
        *self.frame_rx.borrow()
    }

    /// Subscribe to frame snapshots as they are rendered.
    pub fn frames(&self) -> watch::Receiver<FrameSnapshot> {
        self.frame_rx.clone()
    }

    /// Whether the source has delivered everything it ever will.
    pub fn source_finished(&self) -> bool {
        self.source_finished.load(Ordering::SeqCst)
    }
}

impl Drop for GestureSession {
    fn drop(&mut self) {
        // Loops exit on their next tick; the pump releases the source.
        self.stop_flag.store(true, Ordering::SeqCst);
    }
}

async fn join_task<T: Default>(handle: Option<JoinHandle<T>>, task: &str) -> T {
    let Some(handle) = handle else {
        return T::default();
    };
    match handle.await {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!(task, error = %e, "Session task join failed");
            T::default()
        }
    }
}

fn elapsed_ns(epoch: Instant) -> u64 {
    epoch.elapsed().as_nanos() as u64
}

/// Poll the source into the slot until stopped, then release it.
///
/// Per-frame errors are counted and skipped. Any other error means the source
/// is gone: it is not polled again and the absent hand is published once.
async fn pump_source(
    mut guard: SourceGuard,
    slot: LatestFrameSlot,
    epoch: Instant,
    poll_interval: Duration,
    stop_flag: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
) -> PumpReport {
    tracing::info!(source = %guard.name(), "Source pump started");

    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut faults = 0u64;
    let mut lost = false;
    let mut last_sequence = 0u64;

    while !stop_flag.load(Ordering::Relaxed) {
        interval.tick().await;
        if lost {
            continue;
        }

        let now_ns = elapsed_ns(epoch);
        match guard.poll(now_ns) {
            Ok(Some(frame)) => {
                last_sequence = last_sequence.max(frame.sequence);
                slot.publish(frame);
            }
            Ok(None) => {}
            Err(e) if e.is_per_frame() => {
                faults += 1;
                tracing::warn!(error = %e, "Skipping frame after source error");
            }
            Err(e) => {
                faults += 1;
                lost = true;
                tracing::warn!(
                    source = %guard.name(),
                    error = %e,
                    "Landmark source lost, continuing without hand input"
                );
                last_sequence += 1;
                slot.publish(TrackedFrame {
                    sequence: last_sequence,
                    timestamp_ns: now_ns,
                    hand: None,
                });
                finished.store(true, Ordering::SeqCst);
                continue;
            }
        }

        if guard.is_finished() && !finished.swap(true, Ordering::SeqCst) {
            tracing::info!(source = %guard.name(), "Landmark source ended");
        }
    }

    let published = slot.published();
    guard.release();
    PumpReport {
        published,
        faults,
        lost,
    }
}

/// Process the newest slot frame whenever one arrives.
///
/// A frame turned away by the rate gate is held, not discarded. It is
/// processed when the gate reopens unless a newer frame replaces it first,
/// so the last pose a source delivers is never lost.
async fn run_tracker(
    mut reader: LatestFrameReader,
    mut processor: FrameProcessor,
    epoch: Instant,
    tracker_tx: watch::Sender<TrackerSnapshot>,
) -> TrackerReport {
    let mut held: Option<TrackedFrame> = None;

    loop {
        let frame = match held.take() {
            None => match reader.next().await {
                Some(frame) => frame,
                None => break,
            },
            Some(frame) => {
                let reopens = epoch + Duration::from_nanos(processor.gate_reopens_at_ns());
                tokio::select! {
                    newer = reader.next() => match newer {
                        Some(newer) => newer,
                        None => break,
                    },
                    _ = tokio::time::sleep_until(reopens) => frame,
                }
            }
        };

        match processor.process(&frame, elapsed_ns(epoch)) {
            FrameOutcome::Processed { snapshot, .. } => {
                tracker_tx.send_replace(snapshot);
            }
            FrameOutcome::RateDropped => held = Some(frame),
            FrameOutcome::Stale => {}
        }
    }

    let stats = processor.stats();
    tracing::info!(
        processed = stats.processed,
        rate_dropped = stats.rate_dropped,
        stale_skipped = stats.stale_skipped,
        "Tracker loop stopped"
    );
    TrackerReport {
        stats,
        overwritten: reader.overwritten(),
    }
}

/// Advance the formation and fan the snapshot out once per render tick.
async fn run_render(
    mut scene: SceneGraph,
    mut director: FormationDirector,
    tick_hz: u32,
    epoch: Instant,
    tracker_rx: watch::Receiver<TrackerSnapshot>,
    frame_tx: watch::Sender<FrameSnapshot>,
    stop_flag: Arc<AtomicBool>,
) -> RenderReport {
    let period = Duration::from_nanos(1_000_000_000 / tick_hz.max(1) as u64);
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut final_frame = *frame_tx.borrow();

    while !stop_flag.load(Ordering::Relaxed) {
        interval.tick().await;

        let tracker = *tracker_rx.borrow();
        let (frame, dt) = director.tick_at(&tracker, elapsed_ns(epoch));
        scene.broadcast(&frame, dt);
        frame_tx.send_replace(frame);
        final_frame = frame;
    }

    tracing::info!(ticks = director.ticks(), "Render loop stopped");
    RenderReport {
        ticks: director.ticks(),
        final_frame,
        subsystems: scene.reports(),
    }
}
