//! Tinsel CLI: replay, synthesize, and simulate hand-gesture sessions.
//!
//! Usage:
//!   tinsel replay <PATH>       Run a live session over a landmark recording
//!   tinsel synth <OUT>         Write a synthetic landmark recording
//!   tinsel simulate <PATH>     Deterministic offline run, JSON timeline
//!   tinsel config              Show the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tinsel_common::config::{config_file_path, AppConfig};
use tinsel_common::logging::{init_logging, verbosity_level};

mod commands;

#[derive(Parser)]
#[command(
    name = "tinsel",
    about = "Hand-gesture driven formation animation",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a landmark recording through a live session
    Replay {
        /// Path to the JSONL recording
        path: PathBuf,

        /// Stop after this many seconds instead of when the recording ends
        #[arg(long)]
        duration_secs: Option<f64>,
    },

    /// Write a synthetic landmark recording
    Synth {
        /// Output JSONL path
        output: PathBuf,

        /// Gesture script: palm-fist|all
        #[arg(long, default_value = "palm-fist")]
        script: String,

        /// Spacing between tracker callbacks (ms)
        #[arg(long, default_value = "33")]
        interval_ms: u64,
    },

    /// Run a recording offline on a virtual clock
    Simulate {
        /// Path to the JSONL recording
        path: PathBuf,
    },

    /// Show the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config errors are reported after logging is up, not swallowed before.
    let (mut config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    if cli.verbose {
        config.logging.level = verbosity_level(true).to_string();
    }
    init_logging(&config.logging)?;
    if let Some(e) = config_error {
        tracing::warn!(
            path = %config_file_path().display(),
            error = %e,
            "Ignoring config file, using defaults"
        );
    }

    match cli.command {
        Commands::Replay {
            path,
            duration_secs,
        } => commands::replay::run(config, path, duration_secs).await,
        Commands::Synth {
            output,
            script,
            interval_ms,
        } => commands::synth::run(output, &script, interval_ms),
        Commands::Simulate { path } => commands::simulate::run(&config, path),
        Commands::Config { write } => commands::config::run(&config, write),
    }
}
