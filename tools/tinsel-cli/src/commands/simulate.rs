//! Deterministic offline run of a recording.

use std::path::PathBuf;

use tinsel_common::config::AppConfig;
use tinsel_hand_model::recording::{is_record_line, parse_record};
use tinsel_pipeline::simulate;

/// Prints one JSON object per recorded frame, then one summary object.
pub fn run(config: &AppConfig, path: PathBuf) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (index, line) in content.lines().enumerate() {
        if !is_record_line(line) {
            continue;
        }
        match parse_record(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                tracing::warn!(line = index + 1, error = %e, "Skipping malformed record");
            }
        }
    }

    let report = simulate(config, &records)?;

    for entry in &report.timeline {
        println!("{}", serde_json::to_string(entry)?);
    }
    println!(
        "{}",
        serde_json::json!({
            "summary": {
                "records": records.len(),
                "skipped_lines": skipped,
                "stats": report.stats,
                "render_ticks": report.render_ticks,
                "final_frame": report.final_frame,
                "subsystems": report.subsystems,
            }
        })
    );

    Ok(())
}
