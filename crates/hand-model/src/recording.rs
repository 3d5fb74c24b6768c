//! Landmark recording format.
//!
//! Recordings are JSONL: an optional `# {header}` comment line followed by
//! one [`LandmarkRecord`] per tracker callback. A record with `"hand": null`
//! means the tracker ran but found no hand.

use serde::{Deserialize, Serialize};

use crate::landmark::LandmarkFrame;

/// Monotonic timestamp in nanoseconds since recording start.
pub type TimestampNs = u64;

pub const RECORDING_SCHEMA_VERSION: &str = "1.0";

/// Metadata written as the first (comment) line of a recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingHeader {
    pub schema_version: String,

    /// Name of the source that produced the recording.
    pub source: String,

    /// Nominal spacing between tracker callbacks (ms).
    pub frame_interval_ms: u64,
}

impl RecordingHeader {
    pub fn new(source: impl Into<String>, frame_interval_ms: u64) -> Self {
        Self {
            schema_version: RECORDING_SCHEMA_VERSION.to_string(),
            source: source.into(),
            frame_interval_ms,
        }
    }
}

/// One tracker callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkRecord {
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    pub hand: Option<LandmarkFrame>,
}

impl LandmarkRecord {
    pub fn tracked(timestamp_ns: TimestampNs, frame: LandmarkFrame) -> Self {
        Self {
            timestamp_ns,
            hand: Some(frame),
        }
    }

    pub fn absent(timestamp_ns: TimestampNs) -> Self {
        Self {
            timestamp_ns,
            hand: None,
        }
    }
}

/// Whether a line carries a record (not blank, not a comment).
pub fn is_record_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

/// Parse the header from a recording's first line, if it has one.
pub fn parse_header(jsonl: &str) -> Option<RecordingHeader> {
    let first = jsonl.lines().next()?.trim();
    let body = first.strip_prefix('#')?;
    serde_json::from_str(body.trim()).ok()
}

/// Parse a single record line.
pub fn parse_record(line: &str) -> Result<LandmarkRecord, serde_json::Error> {
    serde_json::from_str(line.trim())
}

/// Parse all records; fails on the first malformed line.
pub fn parse_records(jsonl: &str) -> Result<Vec<LandmarkRecord>, serde_json::Error> {
    jsonl
        .lines()
        .filter(|line| is_record_line(line))
        .map(parse_record)
        .collect()
}

/// Serialize records to JSONL (no header).
pub fn serialize_records(records: &[LandmarkRecord]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for record in records {
        output.push_str(&serde_json::to_string(record)?);
        output.push('\n');
    }
    Ok(output)
}
