//! Error types for guideline generation.

use thiserror::Error;

/// Errors that can occur while sampling stations or building guidelines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GuidelineError {
    /// The alignment could not give a point and direction for a station.
    #[error("cannot resolve station {station:.3}: {reason}")]
    StationResolution {
        /// Requested station in metres.
        station: f64,
        /// Why resolution failed.
        reason: String,
    },

    /// Sampling increments are unusable.
    #[error("invalid intervals: {0}")]
    InvalidIntervals(String),

    /// Guideline offsets are unusable.
    #[error("invalid offsets: {0}")]
    InvalidOffsets(String),

    /// Region start lies after its end.
    #[error("invalid region: start {start} is after end {end}")]
    InvalidRegion {
        /// Region start station.
        start: f64,
        /// Region end station.
        end: f64,
    },

    /// Alignment elements are malformed.
    #[error("invalid alignment: {0}")]
    InvalidAlignment(String),
}

impl GuidelineError {
    pub(crate) fn unresolved(station: f64, reason: impl Into<String>) -> Self {
        Self::StationResolution {
            station,
            reason: reason.into(),
        }
    }
}

/// Result type for guideline operations.
pub type Result<T> = std::result::Result<T, GuidelineError>;
