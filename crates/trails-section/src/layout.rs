//! Placing flattened section profiles on a drawing sheet.
//!
//! Profiles fill columns top to bottom. Each column holds
//! `ceil(sqrt(n))` profiles, so `n` profiles form a roughly square grid.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use trails_geom::{segments_from_points, LineSegment, Point3, Polyline2, Vec3};

use crate::convert::convert;
use crate::error::{Result, SectionError};
use crate::extract::extract_wire;
use crate::surface::{CutWire, SurfaceIntersector};

/// Sheet tiling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Sheet position of the first profile.
    pub start_position: Point3,
    /// Width reserved for one profile.
    pub profile_width: f64,
    /// Height reserved for one profile.
    pub profile_height: f64,
    /// Vertical gap between profiles in a column.
    pub row_gap: f64,
    /// Horizontal gap between columns.
    pub col_gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            start_position: Point3::origin(),
            profile_width: 100_000.0,
            profile_height: 50_000.0,
            row_gap: 10_000.0,
            col_gap: 10_000.0,
        }
    }
}

impl LayoutConfig {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.profile_width > 0.0) || !(self.profile_height > 0.0) {
            return Err(SectionError::InvalidLayout(
                "profile width and height must be positive".into(),
            ));
        }
        if !(self.row_gap >= 0.0) || !(self.col_gap >= 0.0) {
            return Err(SectionError::InvalidLayout(
                "row and column gaps must not be negative".into(),
            ));
        }
        if !self.start_position.coords.iter().all(|c| c.is_finite()) {
            return Err(SectionError::InvalidLayout(
                "start position must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// Position of the next profile on the sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetCursor {
    /// Where the next profile goes.
    pub position: Point3,
    /// Top of the current column.
    pub column_top: Point3,
    /// Profiles already placed in the current column.
    pub row_index: usize,
}

impl SheetCursor {
    /// Cursor at the start of the first column.
    pub fn new(start: Point3) -> Self {
        Self {
            position: start,
            column_top: start,
            row_index: 0,
        }
    }

    /// Cursor after placing one profile at `self.position`.
    pub fn step(self, config: &LayoutConfig, per_column: usize) -> Self {
        if self.row_index + 1 >= per_column {
            let column_top =
                self.column_top + Vec3::new(config.profile_width + config.col_gap, 0.0, 0.0);
            Self {
                position: column_top,
                column_top,
                row_index: 0,
            }
        } else {
            Self {
                position: self.position
                    - Vec3::new(0.0, config.profile_height + config.row_gap, 0.0),
                column_top: self.column_top,
                row_index: self.row_index + 1,
            }
        }
    }
}

/// Profiles per column for `count` profiles: `ceil(sqrt(count))`.
pub fn profiles_per_column(count: usize) -> usize {
    (count as f64).sqrt().ceil() as usize
}

/// Sheet positions for `count` profiles in placement order.
pub fn sheet_positions(config: &LayoutConfig, count: usize) -> Vec<Point3> {
    let per_column = profiles_per_column(count);
    std::iter::successors(Some(SheetCursor::new(config.start_position)), |cursor| {
        Some(cursor.step(config, per_column))
    })
    .take(count)
    .map(|cursor| cursor.position)
    .collect()
}

/// One flattened section placed on the sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionProfile2D {
    /// Index of the cut-wire in the input.
    pub wire: usize,
    /// Sheet position the profile is anchored at.
    pub placement: Point3,
    /// Flattened profile in local (slope distance, elevation) coordinates.
    pub profile: Polyline2,
    /// Profile points in sheet coordinates.
    pub sheet_points: Vec<Point3>,
    /// Drawable sheet segments; coincident neighbours are skipped.
    pub segments: Vec<LineSegment>,
}

/// Result of laying out a batch of cut-wires.
#[derive(Debug, Clone, Default)]
pub struct SheetLayout {
    /// Placed profiles in input order.
    pub profiles: Vec<SectionProfile2D>,
    /// Wires that produced no profile. Their grid slot stays empty.
    pub failures: Vec<SectionError>,
    /// Profiles per column used for the grid.
    pub per_column: usize,
}

/// Section, flatten, and place a single cut-wire at `placement`.
pub fn place_wire<S: SurfaceIntersector + ?Sized>(
    index: usize,
    wire: &CutWire,
    surface: &S,
    placement: Point3,
) -> Result<SectionProfile2D> {
    let section = extract_wire(index, wire, surface)?;
    section.require_profile()?;

    let origin = wire.first_vertex().ok_or_else(|| SectionError::EmptyGeometry {
        wire: index,
        reason: "cut-wire has no vertices".into(),
    })?;
    let profile = convert(&section.distinct_points(), origin)
        .map_err(|source| SectionError::Degenerate { wire: index, source })?;

    let sheet_points: Vec<Point3> = profile
        .iter()
        .map(|p| placement + Vec3::new(p.x, p.y, 0.0))
        .collect();
    let segments = segments_from_points(&sheet_points);

    Ok(SectionProfile2D {
        wire: index,
        placement,
        profile,
        sheet_points,
        segments,
    })
}

/// Section every cut-wire and tile the flattened profiles on the sheet.
///
/// Grid slots are assigned by input index before any work is done, so a
/// wire that fails leaves its slot empty and the others stay where they
/// would have been.
pub fn layout<S: SurfaceIntersector + ?Sized>(
    config: &LayoutConfig,
    wires: &[CutWire],
    surface: &S,
) -> Result<SheetLayout> {
    config.validate()?;

    let positions = sheet_positions(config, wires.len());
    let results: Vec<Result<SectionProfile2D>> = wires
        .par_iter()
        .zip(positions.par_iter())
        .enumerate()
        .map(|(idx, (wire, &placement))| place_wire(idx, wire, surface, placement))
        .collect();

    let mut sheet = SheetLayout {
        per_column: profiles_per_column(wires.len()),
        ..Default::default()
    };
    for result in results {
        match result {
            Ok(profile) => sheet.profiles.push(profile),
            Err(e) => {
                warn!("skipping profile: {e}");
                sheet.failures.push(e);
            }
        }
    }

    info!(
        "laid out {} profiles in columns of {} ({} failed)",
        sheet.profiles.len(),
        sheet.per_column,
        sheet.failures.len()
    );
    Ok(sheet)
}
