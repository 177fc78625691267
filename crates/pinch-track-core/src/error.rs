//! Error types for gesture sources.

use pinch_track_config::SourceMode;

#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("{mode} source is misconfigured: {reason}")]
    Misconfiguration { mode: SourceMode, reason: String },

    #[error("Sample unavailable from {source_name}: {reason}")]
    TransientSample {
        source_name: String,
        reason: String,
    },
}

impl TrackingError {
    pub fn misconfigured(mode: SourceMode, reason: impl Into<String>) -> Self {
        TrackingError::Misconfiguration {
            mode,
            reason: reason.into(),
        }
    }

    pub fn transient(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        TrackingError::TransientSample {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackingError>;
