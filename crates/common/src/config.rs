//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{TinselError, TinselResult};

/// Global application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Tracker-side (gesture) parameters.
    pub tracker: TrackerConfig,

    /// Render-side (progress) parameters.
    pub render: RenderConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Parameters for classifying and stabilizing tracker frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum spacing between processed frames (ms). Faster frames are dropped.
    pub min_frame_interval_ms: u64,

    /// Thumb-tip to index-tip distance (normalized) below which a pinch is reported.
    pub pinch_threshold: f64,

    /// Blend factor of the cursor low-pass filter, in `(0, 1]`.
    pub position_alpha: f64,

    /// Consecutive identical candidates required before a gesture is reported.
    pub debounce_frames: u32,
}

/// Parameters for the render tick and the shared formation progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Render tick frequency (Hz).
    pub tick_hz: u32,

    /// Exponential approach rate of the formation progress (per second).
    pub progress_rate: f64,

    /// Distance to the target at which progress snaps onto it.
    pub settle_epsilon: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "tinsel_pipeline=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_frame_interval_ms: 30,
            pinch_threshold: 0.05,
            position_alpha: 0.3,
            debounce_frames: 2,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60,
            progress_rate: 2.0,
            settle_epsilon: 0.001,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location.
    ///
    /// A missing file yields the defaults. An unreadable or invalid file is
    /// an error, left for the caller to report once logging is installed.
    pub fn load() -> TinselResult<Self> {
        Self::load_or_default_from(&config_file_path())
    }

    /// Load config from `path`, or the defaults if there is no file there.
    pub fn load_or_default_from(path: &Path) -> TinselResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> TinselResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> TinselResult<()> {
        let t = &self.tracker;
        if !(t.position_alpha > 0.0 && t.position_alpha <= 1.0) {
            return Err(TinselError::config(format!(
                "tracker.position_alpha must be in (0, 1], got {}",
                t.position_alpha
            )));
        }
        if t.debounce_frames == 0 {
            return Err(TinselError::config("tracker.debounce_frames must be >= 1"));
        }
        if !(t.pinch_threshold >= 0.0) {
            return Err(TinselError::config("tracker.pinch_threshold must be >= 0"));
        }

        let r = &self.render;
        if r.tick_hz == 0 {
            return Err(TinselError::config("render.tick_hz must be > 0"));
        }
        if !(r.progress_rate > 0.0 && r.progress_rate.is_finite()) {
            return Err(TinselError::config("render.progress_rate must be > 0"));
        }
        if !(r.settle_epsilon > 0.0 && r.settle_epsilon < 0.5) {
            return Err(TinselError::config(format!(
                "render.settle_epsilon must be in (0, 0.5), got {}",
                r.settle_epsilon
            )));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("tinsel").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.tracker.min_frame_interval_ms, 30);
        assert_eq!(config.tracker.debounce_frames, 2);
        assert!((config.render.progress_rate - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{ "render": { "tick_hz": 120 } }"#).unwrap();
        assert_eq!(parsed.render.tick_hz, 120);
        assert!((parsed.render.progress_rate - 2.0).abs() < 1e-12);
        assert_eq!(parsed.tracker, TrackerConfig::default());
    }

    #[test]
    fn test_validate_rejects_zero_alpha() {
        let mut config = AppConfig::default();
        config.tracker.position_alpha = 0.0;
        assert!(matches!(
            config.validate(),
            Err(TinselError::Config { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_settle_epsilon() {
        let mut config = AppConfig::default();
        config.render.settle_epsilon = 0.0;
        assert!(matches!(
            config.validate(),
            Err(TinselError::Config { .. })
        ));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("tinsel_test_config_missing/config.json");
        assert_eq!(
            AppConfig::load_or_default_from(&path).unwrap(),
            AppConfig::default()
        );
    }

    #[test]
    fn test_invalid_file_is_reported_not_swallowed() {
        let dir = std::env::temp_dir().join("tinsel_test_config_invalid");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let path = dir.join("config.json");
        std::fs::write(&path, r#"{ "render": { "settle_epsilon": 0.0 } }"#).unwrap();
        assert!(matches!(
            AppConfig::load_or_default_from(&path),
            Err(TinselError::Config { .. })
        ));

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AppConfig::load_or_default_from(&path),
            Err(TinselError::Json(_))
        ));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_from_roundtrip() {
        let dir = std::env::temp_dir().join("tinsel_test_config");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let mut config = AppConfig::default();
        config.logging.level = "debug".to_string();
        let path = dir.join("config.json");
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
        std::fs::remove_dir_all(&dir).ok();
    }
}
