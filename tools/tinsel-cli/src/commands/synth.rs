//! Write a synthetic landmark recording.

use std::path::PathBuf;

use tinsel_hand_model::recording::{LandmarkRecord, RecordingHeader};
use tinsel_hand_model::{synthesize_pose, Gesture};
use tinsel_landmark_source::LandmarkWriter;

/// Frames each scripted pose is held for.
const HOLD_FRAMES: u64 = 12;

pub fn run(output: PathBuf, script: &str, interval_ms: u64) -> anyhow::Result<()> {
    let poses = script_poses(script)?;
    let interval_ns = interval_ms.max(1) * 1_000_000;

    let mut writer = LandmarkWriter::new(
        output.clone(),
        RecordingHeader::new(format!("synth:{script}"), interval_ms),
    )?;

    let mut frame_index = 0u64;
    for (segment, pose) in poses.iter().enumerate() {
        for step in 0..HOLD_FRAMES {
            let t = frame_index * interval_ns;
            let record = match pose {
                Some(gesture) => {
                    // Drift across the frame so the smoothed cursor has work to do.
                    let phase = (segment as u64 * HOLD_FRAMES + step) as f64 * 0.05;
                    let x = 0.5 + 0.2 * phase.sin();
                    let y = 0.5 + 0.1 * phase.cos();
                    LandmarkRecord::tracked(t, synthesize_pose(*gesture, x, y))
                }
                None => LandmarkRecord::absent(t),
            };
            writer.write_record(&record)?;
            frame_index += 1;
        }
    }
    writer.flush()?;

    println!(
        "Wrote {} records ({script}) to {}",
        writer.records_written(),
        writer.path().display()
    );
    Ok(())
}

fn script_poses(script: &str) -> anyhow::Result<Vec<Option<Gesture>>> {
    match script {
        "palm-fist" => Ok(vec![
            Some(Gesture::OpenPalm),
            Some(Gesture::ClosedFist),
            None,
            Some(Gesture::OpenPalm),
            Some(Gesture::ClosedFist),
        ]),
        "all" => Ok(Gesture::ALL
            .iter()
            .flat_map(|g| [Some(*g), None])
            .collect()),
        other => anyhow::bail!("Unknown script '{other}' (expected palm-fist|all)"),
    }
}
