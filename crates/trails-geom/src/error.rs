//! Error types for geometry primitives.

use thiserror::Error;

/// Errors raised by vector operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A zero-length vector was passed to an operation that needs a direction.
    ///
    /// Usually means two consecutive input points coincide, or have no
    /// horizontal displacement, and were not filtered by the caller.
    #[error("degenerate vector in {operation}: ({x}, {y}, {z}) has no direction")]
    DegenerateVector {
        /// Operation that rejected the vector.
        operation: &'static str,
        /// X component.
        x: f64,
        /// Y component.
        y: f64,
        /// Z component.
        z: f64,
    },
}

impl GeometryError {
    pub(crate) fn degenerate(operation: &'static str, v: &crate::Vec3) -> Self {
        Self::DegenerateVector {
            operation,
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, GeometryError>;
