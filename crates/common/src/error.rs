//! Error types shared across Tinsel crates.

/// Top-level error type for Tinsel operations.
///
/// Absence of a hand and unrecognised poses are *values*, not errors; this
/// type only covers genuine failures at the system boundary.
#[derive(Debug, thiserror::Error)]
pub enum TinselError {
    #[error("Landmark source error: {message}")]
    Source { message: String },

    #[error("Invalid landmark frame: {message}")]
    Landmark { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using TinselError.
pub type TinselResult<T> = Result<T, TinselError>;

impl TinselError {
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source {
            message: msg.into(),
        }
    }

    pub fn landmark(msg: impl Into<String>) -> Self {
        Self::Landmark {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error concerns a single frame. Anything else means the
    /// source itself is gone.
    pub fn is_per_frame(&self) -> bool {
        matches!(self, Self::Landmark { .. } | Self::Json(_))
    }
}
