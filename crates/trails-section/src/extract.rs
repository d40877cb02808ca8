//! Cutting terrain sections along cut-wires.

use rayon::prelude::*;
use tracing::{debug, warn};
use trails_geom::{distinct_point_count, segments_from_points, LineSegment, Polyline3, Tolerance};

use crate::error::{Result, SectionError};
use crate::surface::{CutWire, SurfaceIntersector};

/// Inset applied to each edge's end parameters before sampling.
///
/// Sampling exactly at an edge end tends to land on mesh boundaries or on
/// the shared vertex of the next edge.
pub const ENDPOINT_INSET: f64 = 1.0;

/// The terrain section under one cut-wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Section3d {
    /// Index of the cut-wire in the input.
    pub wire: usize,
    /// Projected section points in wire order.
    pub points: Polyline3,
    /// Drawable segments; coincident neighbours are skipped.
    pub segments: Vec<LineSegment>,
    /// Indices of sample points (before projection) that missed the surface.
    pub dropped: Vec<usize>,
    /// Surface crossings discarded for lying within the inset of an edge end.
    pub discarded_crossings: usize,
}

impl Section3d {
    /// Whether the section has nothing to draw.
    pub fn is_degenerate(&self) -> bool {
        self.segments.is_empty()
    }

    /// Section points with consecutive duplicates collapsed.
    pub fn distinct_points(&self) -> Polyline3 {
        let tol = Tolerance::DEFAULT;
        let mut out: Polyline3 = Vec::with_capacity(self.points.len());
        for p in &self.points {
            if out.last().map_or(true, |last| !tol.points_equal(last, p)) {
                out.push(*p);
            }
        }
        out
    }

    /// Fail unless the section has at least two distinct points.
    pub fn require_profile(&self) -> Result<()> {
        let distinct = distinct_point_count(&self.points);
        if distinct < 2 {
            return Err(SectionError::EmptyGeometry {
                wire: self.wire,
                reason: format!("section has {distinct} distinct point(s), need at least 2"),
            });
        }
        Ok(())
    }
}

/// Sections for a batch of cut-wires.
#[derive(Debug, Clone, Default)]
pub struct SectionSet {
    /// Successful sections in input order.
    pub sections: Vec<Section3d>,
    /// Wires that could not be sectioned.
    pub failures: Vec<SectionError>,
}

/// Sample points along `wire`, before projection onto the surface.
///
/// For each edge: the inset first parameter, every surface crossing between
/// the inset ends in ascending order, then the inset last parameter. Edges
/// are concatenated in order. Crossings outside the inset range are
/// discarded so the samples never double back.
pub fn sample_wire<S: SurfaceIntersector + ?Sized>(wire: &CutWire, surface: &S) -> Polyline3 {
    sample_edges(wire, surface).0
}

/// Sample points plus the number of crossings discarded near edge ends.
fn sample_edges<S: SurfaceIntersector + ?Sized>(wire: &CutWire, surface: &S) -> (Polyline3, usize) {
    let mut points = Vec::new();
    let mut discarded = 0;
    for edge in &wire.edges {
        let first = edge.first_parameter() + ENDPOINT_INSET;
        let last = edge.last_parameter() - ENDPOINT_INSET;

        let crossings = surface.find_section_parameters(edge);
        let found = crossings.len();
        let mut params: Vec<f64> = crossings
            .into_iter()
            .filter(|t| *t > first && *t < last)
            .collect();
        discarded += found - params.len();
        params.sort_by(f64::total_cmp);
        params.insert(0, first);
        params.push(last);

        points.extend(params.into_iter().map(|t| edge.value_at(t)));
    }
    (points, discarded)
}

/// Section a single cut-wire.
///
/// `index` identifies the wire in error reports. A wire with no edges fails
/// with [`SectionError::EmptyGeometry`]; a section that collapses to fewer
/// than two distinct points succeeds with no segments.
pub fn extract_wire<S: SurfaceIntersector + ?Sized>(
    index: usize,
    wire: &CutWire,
    surface: &S,
) -> Result<Section3d> {
    if wire.is_empty() {
        return Err(SectionError::EmptyGeometry {
            wire: index,
            reason: "cut-wire has no edges".into(),
        });
    }

    let (samples, discarded_crossings) = sample_edges(wire, surface);
    if discarded_crossings > 0 {
        debug!(
            wire = index,
            "discarded {} crossing(s) within {} of an edge end",
            discarded_crossings,
            ENDPOINT_INSET
        );
    }
    let projected = surface.project_points(&samples);

    let mut points = Vec::with_capacity(samples.len());
    let mut dropped = Vec::new();
    for (i, hit) in projected.into_iter().enumerate() {
        match hit {
            Some(p) => points.push(p),
            None => dropped.push(i),
        }
    }
    if !dropped.is_empty() {
        warn!(
            wire = index,
            "{} of {} sample points missed the surface: {:?}",
            dropped.len(),
            samples.len(),
            dropped
        );
    }

    let segments = segments_from_points(&points);
    if segments.is_empty() {
        warn!(wire = index, "section has no drawable segments");
    }
    debug!(
        wire = index,
        samples = samples.len(),
        segments = segments.len(),
        "extracted section"
    );

    Ok(Section3d {
        wire: index,
        points,
        segments,
        dropped,
        discarded_crossings,
    })
}

/// Section every cut-wire against `surface`.
///
/// Wires are processed in parallel; results keep input order and a failing
/// wire is reported in [`SectionSet::failures`] without affecting others.
pub fn extract<S: SurfaceIntersector + ?Sized>(wires: &[CutWire], surface: &S) -> SectionSet {
    let results: Vec<Result<Section3d>> = wires
        .par_iter()
        .enumerate()
        .map(|(idx, wire)| extract_wire(idx, wire, surface))
        .collect();

    let mut set = SectionSet::default();
    for result in results {
        match result {
            Ok(section) => set.sections.push(section),
            Err(e) => set.failures.push(e),
        }
    }
    set
}

/// All section segments as one unordered collection.
pub fn extract_compound<S: SurfaceIntersector + ?Sized>(
    wires: &[CutWire],
    surface: &S,
) -> Vec<LineSegment> {
    extract(wires, surface)
        .sections
        .into_iter()
        .flat_map(|s| s.segments)
        .collect()
}
