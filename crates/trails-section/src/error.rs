//! Error types for section extraction and layout.

use thiserror::Error;
use trails_geom::GeometryError;

/// Errors that can occur while building sections and profiles.
///
/// Per-wire variants carry the index of the cut-wire (in input order) that
/// failed, so batch callers can report them without aborting other wires.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SectionError {
    /// A cut-wire or its section has too little geometry to work with.
    #[error("cut-wire {wire}: empty geometry: {reason}")]
    EmptyGeometry {
        /// Index of the cut-wire.
        wire: usize,
        /// What was missing.
        reason: String,
    },

    /// A degenerate vector showed up while flattening a section.
    #[error("cut-wire {wire}: {source}")]
    Degenerate {
        /// Index of the cut-wire.
        wire: usize,
        /// Underlying geometry error.
        #[source]
        source: GeometryError,
    },

    /// Terrain mesh data is unusable.
    #[error("invalid terrain mesh: {0}")]
    InvalidMesh(String),

    /// Invalid layout settings.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
}

impl SectionError {
    /// Index of the cut-wire this error belongs to, if any.
    pub fn wire(&self) -> Option<usize> {
        match self {
            SectionError::EmptyGeometry { wire, .. } | SectionError::Degenerate { wire, .. } => {
                Some(*wire)
            }
            SectionError::InvalidMesh(_) | SectionError::InvalidLayout(_) => None,
        }
    }
}

/// Result type for section operations.
pub type Result<T> = std::result::Result<T, SectionError>;
