//! JSON job files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use trails::geom::{Point3, Vec3};
use trails::{
    AlignmentElement, AlignmentModel, CorridorOutput, CorridorSettings, PiecewiseAlignment,
    StraightAlignment, TerrainMesh,
};

/// Terrain as interleaved `[x, y, z, ...]` vertices and triangle indices.
#[derive(Debug, Deserialize)]
pub struct TerrainJob {
    pub vertices: Vec<f64>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AlignmentJob {
    Piecewise {
        elements: Vec<AlignmentElement>,
        #[serde(default = "Point3::origin")]
        origin: Point3,
        #[serde(default)]
        bearing: f64,
    },
    Straight {
        start: Point3,
        end: Point3,
    },
}

/// An alignment built from a job, owning its data.
pub enum Alignment {
    Piecewise(PiecewiseAlignment),
    Straight(StraightAlignment),
}

impl Alignment {
    pub fn model(&self) -> AlignmentModel<'_> {
        match self {
            Alignment::Piecewise(alignment) => AlignmentModel::piecewise(alignment),
            Alignment::Straight(line) => AlignmentModel::straight(line),
        }
    }
}

impl AlignmentJob {
    pub fn build(self) -> Result<Alignment> {
        Ok(match self {
            AlignmentJob::Piecewise {
                elements,
                origin,
                bearing,
            } => Alignment::Piecewise(
                PiecewiseAlignment::from_elements(elements)?.with_placement(origin, bearing),
            ),
            AlignmentJob::Straight { start, end } => {
                Alignment::Straight(StraightAlignment::new(start, end))
            }
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Job {
    pub terrain: TerrainJob,
    pub alignment: AlignmentJob,
    #[serde(default)]
    pub settings: CorridorSettings,
}

impl Job {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("parsing {}", path.display()))
    }

    /// Split into terrain, alignment, and settings.
    pub fn build(self) -> Result<(TerrainMesh, Alignment, CorridorSettings)> {
        let terrain = TerrainMesh::from_flat(&self.terrain.vertices, &self.terrain.indices)
            .context("building terrain")?;
        let alignment = self.alignment.build().context("building alignment")?;
        Ok((terrain, alignment, self.settings))
    }
}

/// One placed profile in the output file.
#[derive(Debug, Serialize)]
pub struct ProfileReport {
    pub station: f64,
    pub placement: Point3,
    pub profile: Vec<[f64; 2]>,
    pub segments: Vec<[Point3; 2]>,
}

#[derive(Debug, Serialize)]
pub struct FailureReport {
    pub station: f64,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct GuidelineReport {
    pub station: f64,
    pub point: Point3,
    pub left: Point3,
    pub right: Point3,
}

/// Contents of the output file.
#[derive(Debug, Serialize)]
pub struct Report {
    pub guidelines: Vec<GuidelineReport>,
    pub profiles: Vec<ProfileReport>,
    pub failures: Vec<FailureReport>,
    pub profiles_per_column: usize,
}

impl Report {
    pub fn new(output: &CorridorOutput) -> Self {
        let guidelines = output
            .guidelines
            .pairs
            .iter()
            .map(|pair| GuidelineReport {
                station: pair.station,
                point: pair.point,
                left: pair.left.start,
                right: pair.right.start,
            })
            .collect();

        let profiles = output
            .sheet
            .profiles
            .iter()
            .filter_map(|profile| {
                Some(ProfileReport {
                    station: output.station_of_wire(profile.wire)?,
                    placement: profile.placement,
                    profile: profile.profile.iter().map(|p| [p.x, p.y]).collect(),
                    segments: profile.segments.iter().map(|s| [s.start, s.end]).collect(),
                })
            })
            .collect();

        let failures = output
            .failed_stations()
            .into_iter()
            .map(|(station, reason)| FailureReport { station, reason })
            .collect();

        Self {
            guidelines,
            profiles,
            failures,
            profiles_per_column: output.sheet.per_column,
        }
    }

    /// Sheet extent `(min, max)` over every profile point.
    pub fn extent(&self) -> Option<(Point3, Point3)> {
        let mut points = self.profiles.iter().flat_map(|p| {
            p.profile
                .iter()
                .map(move |q| p.placement + Vec3::new(q[0], q[1], 0.0))
        });
        let first = points.next()?;
        Some(points.fold((first, first), |(lo, hi), q| (lo.inf(&q), hi.sup(&q))))
    }
}
