//! Transverse guidelines at sampled stations.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use trails_geom::{LineSegment, Point3, Side, Tolerance, Vec3};
use trails_section::CutWire;

use crate::alignment::AlignmentModel;
use crate::error::{GuidelineError, Result};
use crate::stations::{region_stations, IntervalSpec, StationRegion};

/// Guideline extent on each side of the alignment, in model units (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Offsets {
    /// Distance to the left end.
    pub left: f64,
    /// Distance to the right end.
    pub right: f64,
}

impl Default for Offsets {
    fn default() -> Self {
        Self {
            left: 20_000.0,
            right: 20_000.0,
        }
    }
}

/// Guideline generation parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidelineSettings {
    /// Sampling increments per element kind.
    pub intervals: IntervalSpec,
    /// Offsets to either side.
    pub offsets: Offsets,
    /// Stations to keep.
    pub region: StationRegion,
    /// Also place guidelines at element starts.
    pub include_element_breakpoints: bool,
}

impl GuidelineSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        self.intervals.validate()?;
        self.region.validate()?;
        let Offsets { left, right } = self.offsets;
        if !(left >= 0.0) || !(right >= 0.0) || !left.is_finite() || !right.is_finite() {
            return Err(GuidelineError::InvalidOffsets(format!(
                "offsets must be finite and not negative, got left {left} right {right}"
            )));
        }
        // Both halves of the cut-wire would be dropped as zero-length.
        let tol = Tolerance::DEFAULT;
        if tol.is_zero(left) && tol.is_zero(right) {
            return Err(GuidelineError::InvalidOffsets(
                "at least one offset must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// The left and right guideline segments at one station.
///
/// Both segments end on the alignment point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetPair {
    /// Station in metres.
    pub station: f64,
    /// Point on the alignment.
    pub point: Point3,
    /// From the left offset point to the alignment point.
    pub left: LineSegment,
    /// From the right offset point to the alignment point.
    pub right: LineSegment,
}

impl OffsetPair {
    /// Build the pair at `point` from the left-hand unit orthogonal.
    pub fn new(station: f64, point: Point3, left_dir: &Vec3, offsets: &Offsets) -> Self {
        let left_point = point + left_dir * offsets.left;
        let right_point = point - left_dir * offsets.right;
        Self {
            station,
            point,
            left: LineSegment::new(left_point, point),
            right: LineSegment::new(right_point, point),
        }
    }

    /// The offset end point on `side`.
    pub fn end_point(&self, side: Side) -> Point3 {
        match side {
            Side::Left => self.left.start,
            Side::Right => self.right.start,
        }
    }

    /// A connected wire from the left end, through the alignment, to the
    /// right end. Zero-length halves are left out.
    pub fn to_cut_wire(&self) -> CutWire {
        CutWire::new(
            [self.left, self.right.reversed()]
                .into_iter()
                .filter(|e| !e.is_degenerate())
                .collect(),
        )
    }
}

/// Guidelines for a run of stations.
#[derive(Debug, Clone, Default)]
pub struct Guidelines {
    /// Guidelines in ascending station order.
    pub pairs: Vec<OffsetPair>,
    /// Stations that could not be resolved.
    pub failures: Vec<GuidelineError>,
}

impl Guidelines {
    /// Cut-wires for every guideline, in station order.
    pub fn cut_wires(&self) -> Vec<CutWire> {
        self.pairs.iter().map(OffsetPair::to_cut_wire).collect()
    }

    /// Stations that produced a guideline.
    pub fn stations(&self) -> Vec<f64> {
        self.pairs.iter().map(|p| p.station).collect()
    }
}

/// Guideline at a single station.
pub fn guideline_at(
    alignment: &AlignmentModel<'_>,
    station: f64,
    offsets: &Offsets,
) -> Result<OffsetPair> {
    let (point, left_dir) = alignment.resolve(station, Side::Left)?;
    Ok(OffsetPair::new(station, point, &left_dir, offsets))
}

/// Generate guidelines along `alignment`.
///
/// Settings errors fail the whole call. A station the alignment cannot
/// resolve is reported in [`Guidelines::failures`] and the remaining
/// stations are still generated.
pub fn generate(
    alignment: &AlignmentModel<'_>,
    settings: &GuidelineSettings,
) -> Result<Guidelines> {
    settings.validate()?;

    let stations = region_stations(
        alignment,
        &settings.intervals,
        &settings.region,
        settings.include_element_breakpoints,
    )?;

    let results: Vec<Result<OffsetPair>> = stations
        .par_iter()
        .map(|&station| guideline_at(alignment, station, &settings.offsets))
        .collect();

    let mut guidelines = Guidelines::default();
    for result in results {
        match result {
            Ok(pair) => guidelines.pairs.push(pair),
            Err(e) => {
                warn!("skipping guideline: {e}");
                guidelines.failures.push(e);
            }
        }
    }

    info!(
        "generated {} guidelines ({} failed)",
        guidelines.pairs.len(),
        guidelines.failures.len()
    );
    Ok(guidelines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::{
        AlignmentElement, AlignmentEvaluator, PiecewiseAlignment, StraightAlignment,
    };
    use approx::assert_relative_eq;

    fn straight() -> StraightAlignment {
        StraightAlignment::new(Point3::origin(), Point3::new(100_000.0, 0.0, 0.0))
    }

    fn settings(left: f64, right: f64) -> GuidelineSettings {
        GuidelineSettings {
            intervals: IntervalSpec {
                tangent_increment: 25.0,
                curve_increment: 10.0,
                spiral_increment: 5.0,
            },
            offsets: Offsets { left, right },
            region: StationRegion::new(10.0, 80.0),
            include_element_breakpoints: true,
        }
    }

    #[test]
    fn test_offset_points() {
        let line = straight();
        let model = AlignmentModel::straight(&line);
        let guidelines = generate(&model, &settings(7.5, 12.0)).unwrap();

        assert_eq!(guidelines.stations(), vec![25.0, 50.0, 75.0]);
        for pair in &guidelines.pairs {
            let left = pair.end_point(Side::Left);
            let right = pair.end_point(Side::Right);
            assert_relative_eq!((left - pair.point).norm(), 7.5, epsilon = 1e-12);
            assert_relative_eq!((right - pair.point).norm(), 12.0, epsilon = 1e-12);
            assert_relative_eq!(left.y, 7.5, epsilon = 1e-12);
            assert_relative_eq!(right.y, -12.0, epsilon = 1e-12);
            assert_eq!(pair.left.end, pair.point);
            assert_eq!(pair.right.end, pair.point);
        }
        assert_relative_eq!(guidelines.pairs[1].point.x, 50_000.0);
    }

    #[test]
    fn test_cut_wire_runs_left_to_right() {
        let up = Vec3::new(0.0, 1.0, 0.0);
        let pair = OffsetPair::new(0.0, Point3::origin(), &up, &Offsets { left: 5.0, right: 3.0 });
        let wire = pair.to_cut_wire();
        assert_eq!(wire.edges.len(), 2);
        assert_eq!(wire.first_vertex(), Some(Point3::new(0.0, 5.0, 0.0)));
        assert_eq!(wire.edges[0].end, wire.edges[1].start);
        assert_eq!(wire.last_vertex(), Some(Point3::new(0.0, -3.0, 0.0)));

        let one_sided =
            OffsetPair::new(0.0, Point3::origin(), &up, &Offsets { left: 0.0, right: 3.0 });
        assert_eq!(one_sided.to_cut_wire().edges.len(), 1);
    }

    struct FailsAfter {
        limit: f64,
    }

    impl AlignmentEvaluator for FailsAfter {
        fn resolve_station(&self, station: f64, side: Side) -> Result<(Point3, Vec3)> {
            if station > self.limit {
                return Err(GuidelineError::StationResolution {
                    station,
                    reason: "past the end of the model".into(),
                });
            }
            Ok((
                Point3::new(station * 1000.0, 0.0, 0.0),
                Vec3::new(0.0, side.sign(), 0.0),
            ))
        }
    }

    #[test]
    fn test_unresolved_station_is_isolated() {
        let elements = vec![AlignmentElement::line(0.0, 100_000.0)];
        let alignment = PiecewiseAlignment::from_elements(elements).unwrap();
        let evaluator = FailsAfter { limit: 60.0 };
        let model = AlignmentModel::with_evaluator(&alignment, &evaluator);

        let guidelines = generate(&model, &settings(1.0, 1.0)).unwrap();
        assert_eq!(guidelines.stations(), vec![25.0, 50.0]);
        assert_eq!(guidelines.failures.len(), 1);
        assert!(matches!(
            guidelines.failures[0],
            GuidelineError::StationResolution { station, .. } if station == 75.0
        ));
    }

    #[test]
    fn test_piecewise_breakpoint_guidelines() {
        let alignment = PiecewiseAlignment::from_elements(vec![
            AlignmentElement::line(0.0, 40_000.0),
            AlignmentElement::curve(40.0, 60_000.0, 200_000.0, Side::Right),
        ])
        .unwrap();
        let model = AlignmentModel::piecewise(&alignment);
        let mut cfg = settings(2.0, 2.0);
        cfg.region = StationRegion::new(30.0, 100.0);

        let guidelines = generate(&model, &cfg).unwrap();
        // 40 is a curve multiple and a breakpoint, so it appears twice.
        assert_eq!(
            guidelines.stations(),
            vec![40.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0]
        );
        assert!(guidelines.failures.is_empty());
        for pair in &guidelines.pairs {
            assert_relative_eq!(pair.left.length(), 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_negative_offsets_rejected() {
        let line = straight();
        let model = AlignmentModel::straight(&line);
        assert!(matches!(
            generate(&model, &settings(-1.0, 1.0)),
            Err(GuidelineError::InvalidOffsets(_))
        ));
    }

    #[test]
    fn test_zero_offsets_rejected() {
        let line = straight();
        let model = AlignmentModel::straight(&line);
        assert!(matches!(
            generate(&model, &settings(0.0, 0.0)),
            Err(GuidelineError::InvalidOffsets(_))
        ));

        // One side is enough for a drawable cut-wire.
        let guidelines = generate(&model, &settings(0.0, 4.0)).unwrap();
        assert!(guidelines.cut_wires().iter().all(|w| w.edges.len() == 1));
    }

    #[test]
    fn test_sloped_fallback_offsets_are_exact() {
        let line =
            StraightAlignment::new(Point3::origin(), Point3::new(100_000.0, 0.0, 100_000.0));
        let model = AlignmentModel::straight(&line);
        let mut cfg = settings(10_000.0, 6_000.0);
        cfg.region = StationRegion::default();

        let guidelines = generate(&model, &cfg).unwrap();
        assert!(guidelines.failures.is_empty());
        for pair in &guidelines.pairs {
            let left = pair.end_point(Side::Left);
            let right = pair.end_point(Side::Right);
            assert_relative_eq!((left - pair.point).norm(), 10_000.0, epsilon = 1e-9);
            assert_relative_eq!((right - pair.point).norm(), 6_000.0, epsilon = 1e-9);
            assert_eq!(left.z, pair.point.z);
        }
    }

    #[test]
    fn test_vertical_fallback_reports_every_station() {
        let line = StraightAlignment::new(Point3::origin(), Point3::new(0.0, 0.0, 100_000.0));
        let model = AlignmentModel::straight(&line);
        let guidelines = generate(&model, &settings(5.0, 5.0)).unwrap();
        assert!(guidelines.pairs.is_empty());
        assert_eq!(guidelines.failures.len(), 3);
        assert!(guidelines
            .failures
            .iter()
            .all(|e| matches!(e, GuidelineError::StationResolution { .. })));
    }

    #[test]
    fn test_settings_from_partial_json() {
        let cfg: GuidelineSettings =
            serde_json::from_str(r#"{"offsets": {"left": 1500.0, "right": 2500.0}}"#).unwrap();
        assert_eq!(cfg.offsets, Offsets { left: 1500.0, right: 2500.0 });
        assert_eq!(cfg.intervals, IntervalSpec::default());
        assert!(!cfg.include_element_breakpoints);
        assert!(cfg.validate().is_ok());
    }
}
