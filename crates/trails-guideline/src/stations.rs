//! Station sampling along an alignment.
//!
//! Stations are picked per element: every whole station inside the element
//! that is a multiple of the increment for the element's kind. Rules for
//! neighbouring elements can pick the same station; duplicates are kept.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alignment::{AlignmentElement, AlignmentMeta, AlignmentModel, ElementKind};
use crate::error::{GuidelineError, Result};
use crate::units::{round_station, to_boundary};

/// Sampling increments per element kind, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalSpec {
    /// Increment on tangents (and on the straight-edge fallback).
    pub tangent_increment: f64,
    /// Increment on circular curves.
    pub curve_increment: f64,
    /// Increment on spirals.
    pub spiral_increment: f64,
}

impl Default for IntervalSpec {
    fn default() -> Self {
        Self {
            tangent_increment: 20.0,
            curve_increment: 10.0,
            spiral_increment: 5.0,
        }
    }
}

impl IntervalSpec {
    /// Validate increments.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("tangent_increment", self.tangent_increment),
            ("curve_increment", self.curve_increment),
            ("spiral_increment", self.spiral_increment),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(GuidelineError::InvalidIntervals(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Increment used for elements of `kind`.
    pub fn increment(&self, kind: ElementKind) -> f64 {
        match kind {
            ElementKind::Line => self.tangent_increment,
            ElementKind::Curve => self.curve_increment,
            ElementKind::Spiral => self.spiral_increment,
        }
    }
}

/// Inclusive station range to keep, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationRegion {
    /// First station kept.
    pub start: f64,
    /// Last station kept.
    pub end: f64,
}

impl StationRegion {
    /// Create a region.
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Validate the region.
    pub fn validate(&self) -> Result<()> {
        if self.start > self.end || self.start.is_nan() || self.end.is_nan() {
            return Err(GuidelineError::InvalidRegion {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Whether `station` lies in the region, ends included.
    pub fn contains(&self, station: f64) -> bool {
        self.start <= station && station <= self.end
    }
}

impl Default for StationRegion {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: f64::MAX,
        }
    }
}

/// Whole stations `n` with `start <= n < end` that are multiples of `increment`.
fn whole_stations(start: f64, end: f64, increment: f64) -> impl Iterator<Item = f64> {
    let first = start.ceil() as i64;
    let last = end.ceil() as i64;
    (first..last)
        .map(|n| n as f64)
        .filter(move |n| n % increment == 0.0)
}

/// Stations picked along a piecewise alignment, unsorted.
///
/// With `include_breakpoints`, every element start other than station zero
/// is added so that geometry changes always get a guideline. The alignment
/// end station is always added, rounded to the millimetre.
pub fn sample_piecewise(
    meta: &AlignmentMeta,
    elements: &[AlignmentElement],
    intervals: &IntervalSpec,
    include_breakpoints: bool,
) -> Vec<f64> {
    let mut stations = Vec::new();
    for element in elements {
        let start = element.start_station;
        if include_breakpoints && start != 0.0 {
            stations.push(start);
        }
        let increment = intervals.increment(element.kind);
        stations.extend(whole_stations(start, element.end_station(), increment));
    }
    stations.push(round_station(meta.end_station()));
    stations
}

/// Stations picked along a straight edge of `length` mm, unsorted.
pub fn sample_straight(length: f64, tangent_increment: f64) -> Vec<f64> {
    let end = to_boundary(length);
    let mut stations: Vec<f64> = whole_stations(0.0, end, tangent_increment).collect();
    stations.push(round_station(end));
    stations
}

/// Keep stations inside `region` and sort them ascending.
pub fn filter_region(stations: &[f64], region: &StationRegion) -> Vec<f64> {
    let mut kept: Vec<f64> = stations
        .iter()
        .copied()
        .filter(|s| region.contains(*s))
        .collect();
    kept.sort_by(f64::total_cmp);
    kept
}

/// Sorted stations of `alignment` that fall inside `region`.
///
/// Stations outside the alignment's own range are never returned.
pub fn region_stations(
    alignment: &AlignmentModel<'_>,
    intervals: &IntervalSpec,
    region: &StationRegion,
    include_breakpoints: bool,
) -> Result<Vec<f64>> {
    intervals.validate()?;
    region.validate()?;

    let sampled = match alignment {
        AlignmentModel::Piecewise { alignment, .. } => sample_piecewise(
            &alignment.meta,
            &alignment.elements,
            intervals,
            include_breakpoints,
        ),
        AlignmentModel::Straight(line) => {
            sample_straight(line.length(), intervals.tangent_increment)
        }
    };

    let (start, end) = alignment.station_range();
    let bounded = StationRegion::new(region.start.max(start), region.end.min(round_station(end)));
    let stations = if bounded.start <= bounded.end {
        filter_region(&sampled, &bounded)
    } else {
        Vec::new()
    };

    debug!(
        sampled = sampled.len(),
        kept = stations.len(),
        "stations in [{}, {}]",
        region.start,
        region.end
    );
    Ok(stations)
}
