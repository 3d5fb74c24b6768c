//! Logging and tracing initialization.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use crate::config::LoggingConfig;
use crate::error::{TinselError, TinselResult};

/// Initialize the global tracing subscriber from the given configuration.
///
/// `RUST_LOG` takes precedence over `config.level`. When `config.file` is set
/// the log is appended there (without ANSI colours) instead of stderr.
/// Returns `Ok(false)` if a global subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> TinselResult<bool> {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_target(true);

    let installed = match &config.file {
        Some(path) => {
            let writer = Mutex::new(open_log_file(path)?);
            let builder = builder.with_ansi(false).with_writer(writer);
            if config.json {
                install(builder.json().finish())
            } else {
                install(builder.finish())
            }
        }
        None if config.json => install(builder.json().finish()),
        None => install(
            builder
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        ),
    };

    Ok(installed)
}

/// Level filter for the CLI's `--verbose` switch.
pub fn verbosity_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

fn install<S>(subscriber: S) -> bool
where
    S: tracing::Subscriber + Send + Sync + 'static,
{
    tracing::subscriber::set_global_default(subscriber).is_ok()
}

fn open_log_file(path: &Path) -> TinselResult<std::fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| TinselError::config(format!("Cannot open log file {path:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_level() {
        assert_eq!(verbosity_level(true), "debug");
        assert_eq!(verbosity_level(false), "info");
    }

    #[test]
    fn test_open_log_file_creates_parent() {
        let dir = std::env::temp_dir().join("tinsel_test_logging");
        let _ = std::fs::remove_dir_all(&dir);

        let path = dir.join("nested").join("tinsel.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
