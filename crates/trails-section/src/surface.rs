//! The surface port and cut-wire type.

use serde::{Deserialize, Serialize};
use trails_geom::{segments_from_points, LineSegment, Point3};

/// Vertical intersection queries against a terrain surface.
///
/// The vertical axis is always +Z. Implementations must be shareable
/// across threads because wires are processed in parallel.
pub trait SurfaceIntersector: Sync {
    /// Parameters along `edge` where its vertical projection crosses the
    /// surface. Order is not significant; duplicates are allowed.
    fn find_section_parameters(&self, edge: &LineSegment) -> Vec<f64>;

    /// Drop each point vertically onto the surface.
    ///
    /// The result is index-aligned with `points`; `None` marks a point that
    /// lies outside the surface.
    fn project_points(&self, points: &[Point3]) -> Vec<Option<Point3>>;
}

impl<T: SurfaceIntersector + ?Sized> SurfaceIntersector for &T {
    fn find_section_parameters(&self, edge: &LineSegment) -> Vec<f64> {
        (**self).find_section_parameters(edge)
    }

    fn project_points(&self, points: &[Point3]) -> Vec<Option<Point3>> {
        (**self).project_points(points)
    }
}

/// A transverse probe line made of connected edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CutWire {
    /// Edges in path order.
    pub edges: Vec<LineSegment>,
}

impl CutWire {
    /// Create a wire from edges.
    pub fn new(edges: Vec<LineSegment>) -> Self {
        Self { edges }
    }

    /// Create a wire through `points`, skipping coincident neighbours.
    pub fn from_points(points: &[Point3]) -> Self {
        Self::new(segments_from_points(points))
    }

    /// Whether the wire has no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Start of the first edge.
    pub fn first_vertex(&self) -> Option<Point3> {
        self.edges.first().map(|e| e.start)
    }

    /// End of the last edge.
    pub fn last_vertex(&self) -> Option<Point3> {
        self.edges.last().map(|e| e.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_vertices() {
        let wire = CutWire::from_points(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
        ]);
        assert_eq!(wire.edges.len(), 2);
        assert_eq!(wire.first_vertex(), Some(Point3::new(0.0, 0.0, 0.0)));
        assert_eq!(wire.last_vertex(), Some(Point3::new(10.0, 0.0, 0.0)));
        assert!(CutWire::default().first_vertex().is_none());
    }
}
