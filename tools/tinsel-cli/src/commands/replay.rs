//! Replay a landmark recording through a live session.

use std::path::PathBuf;
use std::time::Duration;

use tinsel_common::config::AppConfig;
use tinsel_landmark_source::ReplaySource;
use tinsel_pipeline::{GestureSession, SessionStartReport};
use tokio::time::Instant;

/// Extra render time after the recording ends, so the last transition can
/// play out.
const LINGER: Duration = Duration::from_secs(2);

const STATUS_INTERVAL: Duration = Duration::from_millis(100);

pub async fn run(
    config: AppConfig,
    path: PathBuf,
    duration_secs: Option<f64>,
) -> anyhow::Result<()> {
    println!("Replaying: {}", path.display());

    let mut session = GestureSession::new(config, Box::new(ReplaySource::from_path(&path)));
    match session.start().await? {
        SessionStartReport::Started { source } => println!("  Source: {source}"),
        SessionStartReport::Degraded { reason } => {
            println!("  Source unavailable ({reason}), rendering without hand input")
        }
    }
    println!("Press Ctrl+C to stop...");
    println!();

    let deadline = duration_secs
        .filter(|s| s.is_finite() && *s > 0.0)
        .map(|s| Instant::now() + Duration::from_secs_f64(s));
    let mut finished_at: Option<Instant> = None;
    let mut last_status = None;
    let mut ticker = tokio::time::interval(STATUS_INTERVAL);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = ticker.tick() => {}
        }

        let frame = session.latest_frame();
        let status = (frame.hand.present, frame.hand.gesture, frame.macro_state);
        if last_status != Some(status) {
            println!(
                "[{:>7.2}s] hand={:<5} gesture={:<12} state={:?} progress={:.3}",
                frame.elapsed_secs,
                frame.hand.present,
                frame.hand.gesture.label(),
                frame.macro_state,
                frame.progress
            );
            last_status = Some(status);
        }

        match deadline {
            Some(deadline) if Instant::now() >= deadline => break,
            Some(_) => {}
            None if session.source_finished() => {
                if finished_at.get_or_insert_with(Instant::now).elapsed() >= LINGER {
                    break;
                }
            }
            None => {}
        }
    }

    let summary = session.stop().await?;
    println!();
    println!("Session summary:");
    println!("  Duration: {:.2}s", summary.duration_secs);
    println!(
        "  Frames: {} published, {} processed, {} rate-dropped, {} stale, {} overwritten",
        summary.frames_published,
        summary.tracker.processed,
        summary.tracker.rate_dropped,
        summary.tracker.stale_skipped,
        summary.frames_overwritten
    );
    println!("  Started: {}", summary.started_at);
    println!(
        "  Source faults: {}{}",
        summary.source_faults,
        if summary.source_lost { " (source lost)" } else { "" }
    );
    println!("  Render ticks: {}", summary.render_ticks);
    println!(
        "  Final: state={:?} progress={:.3}",
        summary.final_frame.macro_state, summary.final_frame.progress
    );
    for report in &summary.subsystems {
        println!("    {:<10} presence={:.3}", report.name, report.presence);
    }

    Ok(())
}
