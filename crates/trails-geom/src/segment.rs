//! Straight, parametrized edges.

use serde::{Deserialize, Serialize};

use crate::{Point3, Tolerance, Vec3};

/// A straight edge between two points.
///
/// The edge is parametrized by arc length: parameter `0` is `start` and
/// parameter [`length`](Self::length) is `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    /// Start point.
    pub start: Point3,
    /// End point.
    pub end: Point3,
}

impl LineSegment {
    /// Create a segment from `start` to `end`.
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Length of the segment.
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Vector from start to end.
    pub fn delta(&self) -> Vec3 {
        self.end - self.start
    }

    /// Whether start and end coincide.
    pub fn is_degenerate(&self) -> bool {
        Tolerance::DEFAULT.points_equal(&self.start, &self.end)
    }

    /// Parameter at the start point.
    pub fn first_parameter(&self) -> f64 {
        0.0
    }

    /// Parameter at the end point.
    pub fn last_parameter(&self) -> f64 {
        self.length()
    }

    /// Evaluate the point at arc-length parameter `t`.
    ///
    /// Parameters outside `[first, last]` extrapolate along the line.
    pub fn value_at(&self, t: f64) -> Point3 {
        let len = self.length();
        if len == 0.0 {
            return self.start;
        }
        self.start + self.delta() * (t / len)
    }

    /// The same segment traversed end to start.
    pub fn reversed(&self) -> Self {
        Self::new(self.end, self.start)
    }
}

/// Build the segments joining consecutive points.
///
/// Consecutive coincident points are skipped, so `n` distinct points give
/// `n - 1` segments and every duplicate pair removes one segment. Fewer than
/// two distinct points produce no segments.
pub fn segments_from_points(points: &[Point3]) -> Vec<LineSegment> {
    let tol = Tolerance::DEFAULT;
    points
        .windows(2)
        .filter(|pair| !tol.points_equal(&pair[0], &pair[1]))
        .map(|pair| LineSegment::new(pair[0], pair[1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parametrization() {
        let seg = LineSegment::new(Point3::new(0.0, 0.0, 0.0), Point3::new(3.0, 4.0, 0.0));
        assert_eq!(seg.first_parameter(), 0.0);
        assert_relative_eq!(seg.last_parameter(), 5.0);
        let mid = seg.value_at(2.5);
        assert_relative_eq!(mid.x, 1.5);
        assert_relative_eq!(mid.y, 2.0);
        let end = seg.value_at(seg.last_parameter());
        assert_relative_eq!(end.x, 3.0);
        assert_relative_eq!(end.y, 4.0);
    }

    #[test]
    fn test_segment_count_distinct_points() {
        let points: Vec<Point3> = (0..5).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
        assert_eq!(segments_from_points(&points).len(), 4);
    }

    #[test]
    fn test_segment_count_drops_one_per_duplicate() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(2.0, 1.0, 0.0);
        assert_eq!(segments_from_points(&[a, b, c]).len(), 2);
        assert_eq!(segments_from_points(&[a, a, b, c]).len(), 2);
        assert_eq!(segments_from_points(&[a, a, b, b, c]).len(), 2);
        let segs = segments_from_points(&[a, b, b, c]);
        assert_eq!(segs.len(), 2);
        assert!(segs.iter().all(|s| !s.is_degenerate()));
    }

    #[test]
    fn test_too_few_distinct_points() {
        let a = Point3::new(1.0, 1.0, 1.0);
        assert!(segments_from_points(&[]).is_empty());
        assert!(segments_from_points(&[a]).is_empty());
        assert!(segments_from_points(&[a, a, a]).is_empty());
    }
}
