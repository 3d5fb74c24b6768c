//! Append-only landmark recorder.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use tinsel_common::error::{TinselError, TinselResult};
use tinsel_hand_model::recording::{LandmarkRecord, RecordingHeader};

use crate::TrackedFrame;

const FLUSH_EVERY: u64 = 500;

/// Writes landmark records to a JSONL file, header first.
pub struct LandmarkWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    records_written: u64,
}

impl LandmarkWriter {
    pub fn new(path: PathBuf, header: RecordingHeader) -> TinselResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        let mut writer = BufWriter::new(file);
        let header_json = serde_json::to_string(&header)?;
        writeln!(writer, "# {header_json}")
            .map_err(|e| TinselError::source(format!("Failed to write header: {e}")))?;

        Ok(Self {
            writer,
            path,
            records_written: 0,
        })
    }

    pub fn write_record(&mut self, record: &LandmarkRecord) -> TinselResult<()> {
        let json = serde_json::to_string(record)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| TinselError::source(format!("Failed to write record: {e}")))?;
        self.records_written += 1;

        if self.records_written % FLUSH_EVERY == 0 {
            self.flush()?;
        }
        Ok(())
    }

    /// Record a frame as delivered by a source.
    pub fn write_frame(&mut self, frame: &TrackedFrame) -> TinselResult<()> {
        self.write_record(&LandmarkRecord {
            timestamp_ns: frame.timestamp_ns,
            hand: frame.hand,
        })
    }

    pub fn flush(&mut self) -> TinselResult<()> {
        self.writer
            .flush()
            .map_err(|e| TinselError::source(format!("Failed to flush recording: {e}")))
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for LandmarkWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinsel_hand_model::recording::{parse_header, parse_records};
    use tinsel_hand_model::{synthesize_pose, Gesture};

    #[test]
    fn test_writer_output_parses_back() {
        let dir = std::env::temp_dir().join("tinsel_test_landmark_writer");
        let _ = std::fs::remove_dir_all(&dir);

        let path = dir.join("hand.jsonl");
        {
            let mut writer =
                LandmarkWriter::new(path.clone(), RecordingHeader::new("test", 30)).unwrap();
            writer
                .write_record(&LandmarkRecord::tracked(
                    0,
                    synthesize_pose(Gesture::OpenPalm, 0.5, 0.5),
                ))
                .unwrap();
            writer
                .write_frame(&TrackedFrame {
                    sequence: 2,
                    timestamp_ns: 30_000_000,
                    hand: None,
                })
                .unwrap();
            assert_eq!(writer.records_written(), 2);
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);

        let header = parse_header(&content).unwrap();
        assert_eq!(header.source, "test");
        let records = parse_records(&content).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].hand.is_some());
        assert_eq!(records[1], LandmarkRecord::absent(30_000_000));

        std::fs::remove_dir_all(&dir).ok();
    }
}
