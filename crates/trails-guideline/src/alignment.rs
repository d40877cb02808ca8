//! Alignment models and station evaluation.

use serde::{Deserialize, Serialize};
use trails_geom::{normalize, orthogonal, Point3, Side, Vec3};

use crate::error::{GuidelineError, Result};
use crate::units::{to_boundary, to_internal, STATION_TOLERANCE};

/// Panels per element for Simpson integration of position.
const SIMPSON_PANELS: usize = 64;

/// Geometry type of an alignment element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// Straight tangent.
    Line,
    /// Circular curve.
    Curve,
    /// Transition spiral.
    Spiral,
}

/// One piece of a piecewise horizontal alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentElement {
    /// Element type.
    pub kind: ElementKind,
    /// Station at the element start, in metres.
    pub start_station: f64,
    /// Element length in millimetres.
    pub length: f64,
    /// Signed curvature at the start (1/mm, positive turns left).
    #[serde(default)]
    pub start_curvature: f64,
    /// Signed curvature at the end (1/mm, positive turns left).
    #[serde(default)]
    pub end_curvature: f64,
}

impl AlignmentElement {
    /// A straight tangent.
    pub fn line(start_station: f64, length: f64) -> Self {
        Self {
            kind: ElementKind::Line,
            start_station,
            length,
            start_curvature: 0.0,
            end_curvature: 0.0,
        }
    }

    /// A circular curve of `radius` (mm) turning toward `side`.
    pub fn curve(start_station: f64, length: f64, radius: f64, side: Side) -> Self {
        let k = side.sign() / radius;
        Self {
            kind: ElementKind::Curve,
            start_station,
            length,
            start_curvature: k,
            end_curvature: k,
        }
    }

    /// A clothoid whose radius runs from `start_radius` to `end_radius`
    /// (mm, `None` for a tangent end), turning toward `side`.
    pub fn spiral(
        start_station: f64,
        length: f64,
        start_radius: Option<f64>,
        end_radius: Option<f64>,
        side: Side,
    ) -> Self {
        let k = |r: Option<f64>| r.map_or(0.0, |r| side.sign() / r);
        Self {
            kind: ElementKind::Spiral,
            start_station,
            length,
            start_curvature: k(start_radius),
            end_curvature: k(end_radius),
        }
    }

    /// Station at the element end, in metres.
    pub fn end_station(&self) -> f64 {
        self.start_station + to_boundary(self.length)
    }

    /// Heading change from the element start to `s` mm along it.
    fn turn_at(&self, s: f64) -> f64 {
        if self.length <= 0.0 {
            return 0.0;
        }
        let dk = self.end_curvature - self.start_curvature;
        self.start_curvature * s + dk * s * s / (2.0 * self.length)
    }

    /// Offset from the element start to `s` mm along it, starting on `heading`.
    fn offset_at(&self, heading: f64, s: f64) -> Vec3 {
        if self.start_curvature == 0.0 && self.end_curvature == 0.0 {
            return Vec3::new(heading.cos(), heading.sin(), 0.0) * s;
        }
        let h = s / SIMPSON_PANELS as f64;
        let f = |u: f64| {
            let theta = heading + self.turn_at(u);
            Vec3::new(theta.cos(), theta.sin(), 0.0)
        };
        let mut sum = f(0.0) + f(s);
        for i in 1..SIMPSON_PANELS {
            let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
            sum += f(i as f64 * h) * weight;
        }
        sum * (h / 3.0)
    }
}

/// Alignment-wide metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentMeta {
    /// Station at the alignment start, in metres.
    pub start_station: f64,
    /// Total length in millimetres.
    pub length: f64,
}

impl AlignmentMeta {
    /// Station at the alignment end, in metres.
    pub fn end_station(&self) -> f64 {
        self.start_station + to_boundary(self.length)
    }
}

/// Resolves stations to points and orthogonal directions.
pub trait AlignmentEvaluator: Sync {
    /// Point on the alignment at `station` (metres) and the unit direction
    /// orthogonal to the alignment toward `side`.
    fn resolve_station(&self, station: f64, side: Side) -> Result<(Point3, Vec3)>;
}

/// A piecewise alignment of lines, curves, and spirals.
///
/// Geometry is rebuilt from the element curvatures, starting at `origin`
/// with heading `bearing` (radians, counter-clockwise from +X). The
/// alignment is horizontal at `origin.z`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiecewiseAlignment {
    /// Alignment metadata.
    pub meta: AlignmentMeta,
    /// Elements in station order.
    pub elements: Vec<AlignmentElement>,
    /// Model position of the start station.
    #[serde(default = "Point3::origin")]
    pub origin: Point3,
    /// Heading at the start station.
    #[serde(default)]
    pub bearing: f64,
}

impl PiecewiseAlignment {
    /// Create an alignment starting at the model origin heading along +X.
    pub fn new(meta: AlignmentMeta, elements: Vec<AlignmentElement>) -> Self {
        Self {
            meta,
            elements,
            origin: Point3::origin(),
            bearing: 0.0,
        }
    }

    /// Place the alignment start at `origin` heading along `bearing`.
    pub fn with_placement(mut self, origin: Point3, bearing: f64) -> Self {
        self.origin = origin;
        self.bearing = bearing;
        self
    }

    /// Build an alignment whose metadata spans `elements` exactly.
    pub fn from_elements(elements: Vec<AlignmentElement>) -> Result<Self> {
        let first = elements
            .first()
            .ok_or_else(|| GuidelineError::InvalidAlignment("no elements".into()))?;
        let meta = AlignmentMeta {
            start_station: first.start_station,
            length: elements.iter().map(|e| e.length).sum(),
        };
        let alignment = Self::new(meta, elements);
        alignment.validate()?;
        Ok(alignment)
    }

    /// Check that elements are ordered, contiguous, and cover the metadata.
    pub fn validate(&self) -> Result<()> {
        let Some(first) = self.elements.first() else {
            return Err(GuidelineError::InvalidAlignment("no elements".into()));
        };
        if (first.start_station - self.meta.start_station).abs() > STATION_TOLERANCE {
            return Err(GuidelineError::InvalidAlignment(format!(
                "first element starts at {} but the alignment starts at {}",
                first.start_station, self.meta.start_station
            )));
        }
        for (i, element) in self.elements.iter().enumerate() {
            if !(element.length > 0.0) {
                return Err(GuidelineError::InvalidAlignment(format!(
                    "element {i} has non-positive length {}",
                    element.length
                )));
            }
        }
        for (i, pair) in self.elements.windows(2).enumerate() {
            let gap = pair[1].start_station - pair[0].end_station();
            if gap.abs() > STATION_TOLERANCE {
                return Err(GuidelineError::InvalidAlignment(format!(
                    "element {} starts at {} but element {i} ends at {}",
                    i + 1,
                    pair[1].start_station,
                    pair[0].end_station()
                )));
            }
        }
        let covered: f64 = self.elements.iter().map(|e| e.length).sum();
        if (to_boundary(covered - self.meta.length)).abs() > STATION_TOLERANCE {
            return Err(GuidelineError::InvalidAlignment(format!(
                "elements cover {covered} mm but the alignment is {} mm long",
                self.meta.length
            )));
        }
        Ok(())
    }

    /// Stations covered by the alignment, in metres.
    pub fn station_range(&self) -> (f64, f64) {
        (self.meta.start_station, self.meta.end_station())
    }

    /// Tangent direction and position at `station`.
    fn frame_at(&self, station: f64) -> Result<(Point3, Vec3)> {
        let (start, end) = self.station_range();
        if !station.is_finite()
            || station < start - STATION_TOLERANCE
            || station > end + STATION_TOLERANCE
        {
            return Err(GuidelineError::unresolved(
                station,
                format!("outside alignment range [{start}, {end}]"),
            ));
        }

        let mut position = self.origin;
        let mut heading = self.bearing;
        for (i, element) in self.elements.iter().enumerate() {
            let is_last = i + 1 == self.elements.len();
            if station <= element.end_station() || is_last {
                let s = to_internal(station - element.start_station).clamp(0.0, element.length);
                let point = position + element.offset_at(heading, s);
                let theta = heading + element.turn_at(s);
                return Ok((point, Vec3::new(theta.cos(), theta.sin(), 0.0)));
            }
            position += element.offset_at(heading, element.length);
            heading += element.turn_at(element.length);
        }

        Err(GuidelineError::unresolved(station, "alignment has no elements"))
    }
}

impl AlignmentEvaluator for PiecewiseAlignment {
    fn resolve_station(&self, station: f64, side: Side) -> Result<(Point3, Vec3)> {
        let (point, tangent) = self.frame_at(station)?;
        Ok((point, orthogonal(&tangent, side)))
    }
}

/// A single straight edge used when no piecewise model is available.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StraightAlignment {
    /// Model position of station zero.
    pub start: Point3,
    /// Model position of the last station.
    pub end: Point3,
}

impl StraightAlignment {
    /// Create a straight alignment.
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Edge length in millimetres.
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Point at `station` (metres) and the horizontal unit orthogonal
    /// toward `side`.
    ///
    /// Stations are measured along the edge itself. The orthogonal comes
    /// from the edge's XY projection, so an edge with no horizontal extent
    /// cannot be resolved.
    pub fn line_orthogonal(&self, station: f64, side: Side) -> Result<(Point3, Vec3)> {
        let span = self.end - self.start;
        let delta =
            normalize(&span).map_err(|e| GuidelineError::unresolved(station, e.to_string()))?;
        let heading = normalize(&Vec3::new(span.x, span.y, 0.0))
            .map_err(|e| GuidelineError::unresolved(station, format!("vertical edge: {e}")))?;
        let end = to_boundary(self.length());
        if !station.is_finite() || station < -STATION_TOLERANCE || station > end + STATION_TOLERANCE
        {
            return Err(GuidelineError::unresolved(
                station,
                format!("outside straight alignment range [0, {end}]"),
            ));
        }
        let coord = self.start + delta * to_internal(station);
        Ok((coord, orthogonal(&heading, side)))
    }
}

impl AlignmentEvaluator for StraightAlignment {
    fn resolve_station(&self, station: f64, side: Side) -> Result<(Point3, Vec3)> {
        self.line_orthogonal(station, side)
    }
}

/// The alignment handed to the guideline generator.
#[derive(Clone, Copy)]
pub enum AlignmentModel<'a> {
    /// Typed elements resolved through an evaluator.
    Piecewise {
        /// Element data used for station sampling.
        alignment: &'a PiecewiseAlignment,
        /// Resolves stations to points and directions.
        evaluator: &'a dyn AlignmentEvaluator,
    },
    /// A plain straight edge.
    Straight(&'a StraightAlignment),
}

impl<'a> AlignmentModel<'a> {
    /// A piecewise model evaluated by its own element geometry.
    pub fn piecewise(alignment: &'a PiecewiseAlignment) -> Self {
        Self::Piecewise {
            alignment,
            evaluator: alignment,
        }
    }

    /// A piecewise model evaluated by an external evaluator.
    pub fn with_evaluator(
        alignment: &'a PiecewiseAlignment,
        evaluator: &'a dyn AlignmentEvaluator,
    ) -> Self {
        Self::Piecewise {
            alignment,
            evaluator,
        }
    }

    /// The straight-edge fallback.
    pub fn straight(alignment: &'a StraightAlignment) -> Self {
        Self::Straight(alignment)
    }

    /// Stations covered by the model, in metres.
    pub fn station_range(&self) -> (f64, f64) {
        match self {
            AlignmentModel::Piecewise { alignment, .. } => alignment.station_range(),
            AlignmentModel::Straight(line) => (0.0, to_boundary(line.length())),
        }
    }

    /// Point at `station` and the orthogonal toward `side`.
    pub fn resolve(&self, station: f64, side: Side) -> Result<(Point3, Vec3)> {
        match self {
            AlignmentModel::Piecewise { evaluator, .. } => evaluator.resolve_station(station, side),
            AlignmentModel::Straight(line) => line.line_orthogonal(station, side),
        }
    }
}

impl std::fmt::Debug for AlignmentModel<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignmentModel::Piecewise { alignment, .. } => f
                .debug_struct("Piecewise")
                .field("alignment", alignment)
                .finish_non_exhaustive(),
            AlignmentModel::Straight(line) => f.debug_tuple("Straight").field(line).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn tangent_curve_tangent() -> PiecewiseAlignment {
        // 100 m tangent, quarter circle of radius 100 m to the left, 50 m tangent.
        let radius = 100_000.0;
        let arc = radius * FRAC_PI_2;
        PiecewiseAlignment::from_elements(vec![
            AlignmentElement::line(0.0, 100_000.0),
            AlignmentElement::curve(100.0, arc, radius, Side::Left),
            AlignmentElement::line(100.0 + arc / 1000.0, 50_000.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_tangent_station() {
        let alignment = tangent_curve_tangent();
        let (p, left) = alignment.resolve_station(40.0, Side::Left).unwrap();
        assert_relative_eq!(p.x, 40_000.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(left.y, 1.0, epsilon = 1e-12);

        let (_, right) = alignment.resolve_station(40.0, Side::Right).unwrap();
        assert_relative_eq!(right.y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_curve_end_matches_circle() {
        let alignment = tangent_curve_tangent();
        let curve_end = alignment.elements[1].end_station();
        let (p, left) = alignment.resolve_station(curve_end, Side::Left).unwrap();
        // Centre of the curve is (100 m, 100 m); a quarter turn ends at (200 m, 100 m).
        assert_relative_eq!(p.x, 200_000.0, epsilon = 1e-3);
        assert_relative_eq!(p.y, 100_000.0, epsilon = 1e-3);
        // Heading is now +Y, so left points toward -X.
        assert_relative_eq!(left.x, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_last_tangent_continues_heading() {
        let alignment = tangent_curve_tangent();
        let (_, end) = alignment.station_range();
        let (p, _) = alignment.resolve_station(end, Side::Left).unwrap();
        assert_relative_eq!(p.x, 200_000.0, epsilon = 1e-3);
        assert_relative_eq!(p.y, 150_000.0, epsilon = 1e-3);
    }

    #[test]
    fn test_spiral_turn() {
        // Spiral from tangent to radius R over L turns by L / (2R).
        let element = AlignmentElement::spiral(0.0, 50_000.0, None, Some(200_000.0), Side::Right);
        assert_relative_eq!(element.turn_at(50_000.0), -0.125, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_range_station() {
        let alignment = tangent_curve_tangent();
        let err = alignment.resolve_station(-1.0, Side::Left).unwrap_err();
        assert!(matches!(err, GuidelineError::StationResolution { .. }));
        assert!(alignment.resolve_station(1.0e6, Side::Left).is_err());
    }

    #[test]
    fn test_validate_rejects_gaps() {
        let alignment = PiecewiseAlignment::new(
            AlignmentMeta {
                start_station: 0.0,
                length: 200_000.0,
            },
            vec![
                AlignmentElement::line(0.0, 100_000.0),
                AlignmentElement::line(120.0, 100_000.0),
            ],
        );
        assert!(matches!(
            alignment.validate(),
            Err(GuidelineError::InvalidAlignment(_))
        ));
    }

    #[test]
    fn test_straight_alignment() {
        let line = StraightAlignment::new(Point3::origin(), Point3::new(100_000.0, 0.0, 0.0));
        let (p, left) = line.line_orthogonal(25.0, Side::Left).unwrap();
        assert_relative_eq!(p.x, 25_000.0);
        assert_eq!(left, Vec3::new(-0.0, 1.0, 0.0));
        assert!(line.line_orthogonal(101.0, Side::Left).is_err());

        let collapsed = StraightAlignment::new(Point3::origin(), Point3::origin());
        assert!(matches!(
            collapsed.line_orthogonal(0.0, Side::Left),
            Err(GuidelineError::StationResolution { .. })
        ));
    }

    #[test]
    fn test_sloped_straight_alignment() {
        let line =
            StraightAlignment::new(Point3::origin(), Point3::new(100_000.0, 0.0, 100_000.0));
        let (p, left) = line.line_orthogonal(10.0, Side::Left).unwrap();
        // Stations run along the sloped edge.
        assert_relative_eq!((p - line.start).norm(), 10_000.0, epsilon = 1e-9);
        assert_relative_eq!(p.x, p.z, epsilon = 1e-9);
        assert_relative_eq!(left.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(left.y, 1.0, epsilon = 1e-12);
        assert_eq!(left.z, 0.0);

        let (_, right) = line.line_orthogonal(10.0, Side::Right).unwrap();
        assert_relative_eq!(right.y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_vertical_straight_alignment_is_unresolved() {
        let line = StraightAlignment::new(Point3::origin(), Point3::new(0.0, 0.0, 50_000.0));
        assert!(matches!(
            line.line_orthogonal(10.0, Side::Left),
            Err(GuidelineError::StationResolution { station, .. }) if station == 10.0
        ));
    }
}
