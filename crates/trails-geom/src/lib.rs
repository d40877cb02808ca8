#![warn(missing_docs)]

//! Geometry primitives for the trails corridor engine.
//!
//! Thin wrappers around nalgebra providing the point, vector, and segment
//! types shared by section extraction and guideline generation, plus the
//! handful of vector operations whose degenerate cases the engine cares
//! about (angles and normalization of zero-length vectors).

pub mod error;
pub mod polyline;
pub mod segment;

pub use error::{GeometryError, Result};
pub use polyline::{distinct_point_count, Polyline2, Polyline3};
pub use segment::{segments_from_points, LineSegment};

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A point in a 2D drawing plane.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
}

impl Tolerance {
    /// Default tolerance (1e-6 mm).
    pub const DEFAULT: Self = Self { linear: 1e-6 };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Side of a path, looking along its direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Left-hand side.
    #[default]
    Left,
    /// Right-hand side.
    Right,
}

impl Side {
    /// `1.0` for left, `-1.0` for right.
    pub fn sign(self) -> f64 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }
}

/// Normalize `v`, failing when it has no length.
pub fn normalize(v: &Vec3) -> Result<Vec3> {
    let len = v.norm();
    if Tolerance::DEFAULT.is_zero(len) {
        return Err(GeometryError::degenerate("normalize", v));
    }
    Ok(v / len)
}

/// Unsigned angle between `a` and `b` in `[0, π]`.
///
/// Fails with [`GeometryError::DegenerateVector`] if either operand is
/// zero-length.
pub fn angle_between(a: &Vec3, b: &Vec3) -> Result<f64> {
    let la = a.norm();
    if Tolerance::DEFAULT.is_zero(la) {
        return Err(GeometryError::degenerate("angle_between", a));
    }
    let lb = b.norm();
    if Tolerance::DEFAULT.is_zero(lb) {
        return Err(GeometryError::degenerate("angle_between", b));
    }
    // Clamp: rounding can push the cosine just outside [-1, 1].
    let cos = (a.dot(b) / (la * lb)).clamp(-1.0, 1.0);
    Ok(cos.acos())
}

/// Left-hand orthogonal of a horizontal direction: `(-d.y, d.x, 0)`.
///
/// `d` is expected to be normalized already; the result then has unit length.
pub fn left_orthogonal(d: &Vec3) -> Vec3 {
    Vec3::new(-d.y, d.x, 0.0)
}

/// Right-hand orthogonal, the negation of [`left_orthogonal`].
pub fn right_orthogonal(d: &Vec3) -> Vec3 {
    -left_orthogonal(d)
}

/// Orthogonal of `d` toward `side`.
pub fn orthogonal(d: &Vec3, side: Side) -> Vec3 {
    left_orthogonal(d) * side.sign()
}
