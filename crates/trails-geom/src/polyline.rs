//! Polyline aliases and helpers.

use crate::{Point2, Point3, Tolerance};

/// An ordered 3D point path.
pub type Polyline3 = Vec<Point3>;

/// An ordered 2D point path.
pub type Polyline2 = Vec<Point2>;

/// Number of points left after collapsing consecutive duplicates.
pub fn distinct_point_count(points: &[Point3]) -> usize {
    if points.is_empty() {
        return 0;
    }
    let tol = Tolerance::DEFAULT;
    1 + points
        .windows(2)
        .filter(|w| !tol.points_equal(&w[0], &w[1]))
        .count()
}
