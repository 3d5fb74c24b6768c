//! Landmark source backend implementations.
//!
//! Each backend is a different way of producing tracker callbacks: a fixed
//! script, a paced JSONL replay, or a placeholder for a camera that could not
//! be acquired.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tinsel_common::error::{TinselError, TinselResult};
use tinsel_hand_model::recording::{is_record_line, parse_record};
use tinsel_hand_model::{synthesize_pose, Gesture, LandmarkFrame};

use crate::{LandmarkSource, TrackedFrame};

/// Shared open/close counters for a source, observable after the source has
/// been moved into a session.
#[derive(Debug, Clone, Default)]
pub struct SourceLifecycle {
    opened: Arc<AtomicU32>,
    closed: Arc<AtomicU32>,
}

impl SourceLifecycle {
    pub fn opened(&self) -> u32 {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> u32 {
        self.closed.load(Ordering::SeqCst)
    }

    /// Opened at least once and every open has been matched by a close.
    pub fn is_released(&self) -> bool {
        self.closed() >= self.opened().max(1)
    }

    fn mark_open(&self) {
        self.opened.fetch_add(1, Ordering::SeqCst);
    }

    fn mark_closed(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// One scripted tracker callback.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    Hand(LandmarkFrame),
    Absent,
    /// Nothing new this poll, as when the camera is paused.
    Pause,
    /// A callback that fails for this frame only.
    Fault(String),
    /// The device goes away; this and every later poll fails.
    Disconnect(String),
}

impl ScriptStep {
    /// A synthetic hand making `gesture`, centred at `(x, y)`.
    pub fn pose(gesture: Gesture, x: f64, y: f64) -> Self {
        Self::Hand(synthesize_pose(gesture, x, y))
    }
}

/// Source that plays back a fixed list of steps.
///
/// Unpaced scripts deliver one step per poll. Paced scripts make step `i`
/// due at `i * interval` and deliver the newest due step, dropping older
/// undelivered ones.
pub struct ScriptedSource {
    steps: Vec<ScriptStep>,
    cursor: usize,
    interval_ns: Option<u64>,
    is_open: bool,
    disconnected: Option<String>,
    lifecycle: SourceLifecycle,
}

impl ScriptedSource {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps,
            cursor: 0,
            interval_ns: None,
            is_open: false,
            disconnected: None,
            lifecycle: SourceLifecycle::default(),
        }
    }

    /// Release steps on a fixed cadence instead of one per poll.
    pub fn paced(mut self, interval: std::time::Duration) -> Self {
        self.interval_ns = Some(interval.as_nanos() as u64);
        self
    }

    pub fn lifecycle(&self) -> SourceLifecycle {
        self.lifecycle.clone()
    }

    pub fn remaining(&self) -> usize {
        self.steps.len() - self.cursor
    }

    fn due_index(&self, now_ns: u64) -> Option<usize> {
        match self.interval_ns {
            None => (self.cursor < self.steps.len()).then_some(self.cursor),
            Some(interval) => {
                let due = (now_ns / interval.max(1)) as usize;
                let last = due.min(self.steps.len().checked_sub(1)?);
                (last >= self.cursor).then_some(last)
            }
        }
    }
}

impl LandmarkSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    fn open(&mut self) -> TinselResult<()> {
        self.is_open = true;
        self.lifecycle.mark_open();
        Ok(())
    }

    fn poll(&mut self, now_ns: u64) -> TinselResult<Option<TrackedFrame>> {
        if !self.is_open {
            return Err(TinselError::source("scripted source polled before open"));
        }
        if let Some(reason) = &self.disconnected {
            return Err(TinselError::source(reason.clone()));
        }
        let Some(index) = self.due_index(now_ns) else {
            return Ok(None);
        };
        self.cursor = index + 1;

        let timestamp_ns = match self.interval_ns {
            Some(interval) => index as u64 * interval,
            None => now_ns,
        };
        let sequence = index as u64 + 1;

        match &self.steps[index] {
            ScriptStep::Hand(frame) => Ok(Some(TrackedFrame {
                sequence,
                timestamp_ns,
                hand: Some(*frame),
            })),
            ScriptStep::Absent => Ok(Some(TrackedFrame {
                sequence,
                timestamp_ns,
                hand: None,
            })),
            ScriptStep::Pause => Ok(None),
            ScriptStep::Fault(message) => Err(TinselError::landmark(format!(
                "scripted step {sequence}: {message}"
            ))),
            ScriptStep::Disconnect(reason) => {
                self.disconnected = Some(reason.clone());
                Err(TinselError::source(reason.clone()))
            }
        }
    }

    fn close(&mut self) {
        self.is_open = false;
        self.lifecycle.mark_closed();
    }

    fn is_finished(&self) -> bool {
        self.disconnected.is_none() && self.cursor >= self.steps.len()
    }
}

/// Source that replays a JSONL landmark recording against the session clock.
///
/// Timestamps count from the first record, so recordings stamped with
/// absolute time replay from the start. A record becomes due once the
/// session time reaches its offset. Each poll delivers the newest due record;
/// malformed lines fail only the poll that reaches them.
pub struct ReplaySource {
    path: Option<PathBuf>,
    lines: Vec<(usize, String)>,
    cursor: usize,
    base_ns: Option<u64>,
    skipped: u64,
    lifecycle: SourceLifecycle,
}

impl ReplaySource {
    /// Replay the recording at `path`. The file is read on `open`.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            lines: Vec::new(),
            cursor: 0,
            base_ns: None,
            skipped: 0,
            lifecycle: SourceLifecycle::default(),
        }
    }

    /// Replay an in-memory recording.
    pub fn from_jsonl(contents: &str) -> Self {
        let mut source = Self {
            path: None,
            lines: Vec::new(),
            cursor: 0,
            base_ns: None,
            skipped: 0,
            lifecycle: SourceLifecycle::default(),
        };
        source.load(contents);
        source
    }

    pub fn lifecycle(&self) -> SourceLifecycle {
        self.lifecycle.clone()
    }

    /// Due records that were superseded before they could be delivered.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn load(&mut self, contents: &str) {
        self.lines = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| is_record_line(line))
            .map(|(index, line)| (index + 1, line.to_string()))
            .collect();
        self.cursor = 0;
        self.base_ns = None;
    }
}

impl LandmarkSource for ReplaySource {
    fn name(&self) -> &str {
        "replay"
    }

    fn open(&mut self) -> TinselResult<()> {
        self.lifecycle.mark_open();
        if let Some(path) = &self.path {
            let contents = std::fs::read_to_string(path).map_err(|e| {
                TinselError::source(format!("Failed to read {}: {e}", path.display()))
            })?;
            self.load(&contents);
        }
        tracing::debug!(records = self.lines.len(), "Replay recording loaded");
        Ok(())
    }

    fn poll(&mut self, now_ns: u64) -> TinselResult<Option<TrackedFrame>> {
        let mut latest: Option<TrackedFrame> = None;

        while let Some((line_no, text)) = self.lines.get(self.cursor) {
            let record = match parse_record(text) {
                Ok(record) => record,
                // Deliver what we have; the bad line fails the next poll.
                Err(_) if latest.is_some() => break,
                Err(e) => {
                    self.cursor += 1;
                    return Err(TinselError::landmark(format!("line {line_no}: {e}")));
                }
            };
            let base_ns = *self.base_ns.get_or_insert(record.timestamp_ns);
            let offset_ns = record.timestamp_ns.saturating_sub(base_ns);
            if offset_ns > now_ns {
                break;
            }
            if latest.is_some() {
                self.skipped += 1;
            }
            latest = Some(TrackedFrame {
                sequence: *line_no as u64,
                timestamp_ns: offset_ns,
                hand: record.hand,
            });
            self.cursor += 1;
        }

        Ok(latest)
    }

    fn close(&mut self) {
        self.lines.clear();
        self.lifecycle.mark_closed();
    }

    fn is_finished(&self) -> bool {
        self.cursor >= self.lines.len()
    }
}

/// Stand-in for a capture device that is missing or refused access.
pub struct UnavailableSource {
    reason: String,
    lifecycle: SourceLifecycle,
}

impl UnavailableSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            lifecycle: SourceLifecycle::default(),
        }
    }

    pub fn lifecycle(&self) -> SourceLifecycle {
        self.lifecycle.clone()
    }
}

impl LandmarkSource for UnavailableSource {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn open(&mut self) -> TinselResult<()> {
        self.lifecycle.mark_open();
        Err(TinselError::source(self.reason.clone()))
    }

    fn poll(&mut self, _now_ns: u64) -> TinselResult<Option<TrackedFrame>> {
        Err(TinselError::source(self.reason.clone()))
    }

    fn close(&mut self) {
        self.lifecycle.mark_closed();
    }

    fn is_finished(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tinsel_hand_model::recording::{serialize_records, LandmarkRecord};

    const MS: u64 = 1_000_000;

    #[test]
    fn test_scripted_delivers_one_step_per_poll() {
        let mut source = ScriptedSource::new(vec![
            ScriptStep::pose(Gesture::OpenPalm, 0.5, 0.5),
            ScriptStep::Absent,
        ]);
        source.open().unwrap();

        let first = source.poll(0).unwrap().unwrap();
        assert_eq!(first.sequence, 1);
        assert!(first.hand.is_some());

        let second = source.poll(10).unwrap().unwrap();
        assert_eq!(second.sequence, 2);
        assert!(second.hand.is_none());

        assert!(source.poll(20).unwrap().is_none());
        assert!(source.is_finished());
    }

    #[test]
    fn test_scripted_pause_and_fault() {
        let mut source = ScriptedSource::new(vec![
            ScriptStep::Pause,
            ScriptStep::Fault("19 joints".into()),
            ScriptStep::Absent,
        ]);
        source.open().unwrap();

        assert!(source.poll(0).unwrap().is_none());
        let err = source.poll(1).unwrap_err();
        assert!(err.is_per_frame());
        assert_eq!(source.poll(2).unwrap().unwrap().sequence, 3);
    }

    #[test]
    fn test_scripted_disconnect_is_permanent() {
        let mut source = ScriptedSource::new(vec![
            ScriptStep::Disconnect("camera unplugged".into()),
            ScriptStep::Absent,
        ]);
        source.open().unwrap();

        for now in [0, 1, 2] {
            let err = source.poll(now).unwrap_err();
            assert!(matches!(err, TinselError::Source { .. }));
            assert!(!err.is_per_frame());
        }
        assert!(!source.is_finished());
    }

    #[test]
    fn test_scripted_requires_open() {
        let mut source = ScriptedSource::new(vec![ScriptStep::Absent]);
        assert!(source.poll(0).is_err());
    }

    #[test]
    fn test_paced_script_keeps_only_newest_due_step() {
        let mut source = ScriptedSource::new(vec![
            ScriptStep::pose(Gesture::OpenPalm, 0.5, 0.5),
            ScriptStep::pose(Gesture::ClosedFist, 0.5, 0.5),
            ScriptStep::pose(Gesture::Victory, 0.5, 0.5),
        ])
        .paced(Duration::from_millis(30));
        source.open().unwrap();

        assert_eq!(source.poll(0).unwrap().unwrap().sequence, 1);
        assert!(source.poll(10 * MS).unwrap().is_none());

        // Steps 2 and 3 are both due; only step 3 is delivered.
        let frame = source.poll(65 * MS).unwrap().unwrap();
        assert_eq!(frame.sequence, 3);
        assert_eq!(frame.timestamp_ns, 60 * MS);
        assert!(source.poll(500 * MS).unwrap().is_none());
    }

    fn recording() -> String {
        let palm = synthesize_pose(Gesture::OpenPalm, 0.5, 0.5);
        let records = vec![
            LandmarkRecord::tracked(0, palm),
            LandmarkRecord::tracked(30 * MS, palm),
            LandmarkRecord::absent(60 * MS),
        ];
        format!(
            "# {{\"schema_version\":\"1.0\",\"source\":\"test\",\"frame_interval_ms\":30}}\n{}",
            serialize_records(&records).unwrap()
        )
    }

    #[test]
    fn test_replay_paces_against_session_time() {
        let mut source = ReplaySource::from_jsonl(&recording());
        source.open().unwrap();

        let first = source.poll(0).unwrap().unwrap();
        assert_eq!(first.timestamp_ns, 0);
        assert!(source.poll(10 * MS).unwrap().is_none());

        let last = source.poll(100 * MS).unwrap().unwrap();
        assert_eq!(last.timestamp_ns, 60 * MS);
        assert!(last.hand.is_none());
        assert_eq!(source.skipped(), 1);
        assert!(source.is_finished());
    }

    #[test]
    fn test_replay_counts_from_first_record() {
        let epoch_ns = 1_700_000_000_000_000_000;
        let contents = format!(
            "{{\"t\":{},\"hand\":null}}\n{{\"t\":{},\"hand\":null}}\n",
            epoch_ns,
            epoch_ns + 40 * MS
        );
        let mut source = ReplaySource::from_jsonl(&contents);
        source.open().unwrap();

        assert_eq!(source.poll(0).unwrap().unwrap().timestamp_ns, 0);
        assert!(source.poll(20 * MS).unwrap().is_none());
        assert_eq!(source.poll(40 * MS).unwrap().unwrap().timestamp_ns, 40 * MS);
        assert!(source.is_finished());
    }

    #[test]
    fn test_replay_malformed_line_fails_only_its_poll() {
        let contents = "{\"t\":0,\"hand\":null}\n{not json}\n{\"t\":5,\"hand\":null}\n";
        let mut source = ReplaySource::from_jsonl(contents);
        source.open().unwrap();

        // The good first record is delivered before the bad line is touched.
        assert_eq!(source.poll(10).unwrap().unwrap().sequence, 1);
        let err = source.poll(10).unwrap_err();
        assert!(err.is_per_frame());
        assert!(err.to_string().contains("line 2"));
        assert_eq!(source.poll(10).unwrap().unwrap().sequence, 3);
    }

    #[test]
    fn test_replay_rejects_wrong_joint_count() {
        let contents = "{\"t\":0,\"hand\":[{\"x\":0.5,\"y\":0.5}]}\n";
        let mut source = ReplaySource::from_jsonl(contents);
        source.open().unwrap();
        let err = source.poll(0).unwrap_err();
        assert!(err.is_per_frame());
    }

    #[test]
    fn test_replay_missing_file_is_source_error() {
        let mut source = ReplaySource::from_path("/nonexistent/tinsel/recording.jsonl");
        let err = source.open().unwrap_err();
        assert!(matches!(err, TinselError::Source { .. }));
    }

    #[test]
    fn test_unavailable_source_never_opens() {
        let mut source = UnavailableSource::new("camera permission denied");
        assert!(source.open().is_err());
        assert!(source.poll(0).is_err());
        source.close();
        assert!(source.lifecycle().is_released());
    }
}
