//! Guidelines to section sheet, in one job.

use serde::{Deserialize, Serialize};
use tracing::info;
use trails_guideline::{
    generate, region_stations, AlignmentModel, GuidelineError, GuidelineSettings, Guidelines,
};
use trails_section::{layout, LayoutConfig, SectionError, SheetLayout, SurfaceIntersector};

use crate::error::Result;

/// Settings for a full corridor job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorridorSettings {
    /// Station sampling and guideline offsets.
    pub guidelines: GuidelineSettings,
    /// Sheet tiling.
    pub layout: LayoutConfig,
}

impl CorridorSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        self.guidelines.validate()?;
        self.layout.validate()?;
        Ok(())
    }
}

/// Everything a corridor job produced.
#[derive(Debug, Clone, Default)]
pub struct CorridorOutput {
    /// Guidelines in station order. Wire `i` of the sheet is `pairs[i]`.
    pub guidelines: Guidelines,
    /// Placed section profiles.
    pub sheet: SheetLayout,
}

impl CorridorOutput {
    /// Station of the guideline that produced sheet wire `wire`.
    pub fn station_of_wire(&self, wire: usize) -> Option<f64> {
        self.guidelines.pairs.get(wire).map(|pair| pair.station)
    }

    /// Stations that produced no profile, with the reason.
    pub fn failed_stations(&self) -> Vec<(f64, String)> {
        let unresolved = self.guidelines.failures.iter().filter_map(|e| match e {
            GuidelineError::StationResolution { station, .. } => Some((*station, e.to_string())),
            _ => None,
        });
        let unsectioned = self.sheet.failures.iter().filter_map(|e: &SectionError| {
            let station = self.station_of_wire(e.wire()?)?;
            Some((station, e.to_string()))
        });
        let mut failed: Vec<(f64, String)> = unresolved.chain(unsectioned).collect();
        failed.sort_by(|a, b| a.0.total_cmp(&b.0));
        failed
    }
}

/// An alignment over a terrain surface.
pub struct Corridor<'a, S: SurfaceIntersector + ?Sized> {
    alignment: AlignmentModel<'a>,
    surface: &'a S,
}

impl<'a, S: SurfaceIntersector + ?Sized> Corridor<'a, S> {
    /// Create a corridor.
    pub fn new(alignment: AlignmentModel<'a>, surface: &'a S) -> Self {
        Self { alignment, surface }
    }

    /// The alignment.
    pub fn alignment(&self) -> &AlignmentModel<'a> {
        &self.alignment
    }

    /// Stations the job would place guidelines at.
    pub fn stations(&self, settings: &GuidelineSettings) -> Result<Vec<f64>> {
        Ok(region_stations(
            &self.alignment,
            &settings.intervals,
            &settings.region,
            settings.include_element_breakpoints,
        )?)
    }

    /// Generate guidelines, cut the terrain under each, and tile the profiles.
    pub fn run(&self, settings: &CorridorSettings) -> Result<CorridorOutput> {
        settings.validate()?;

        let guidelines = generate(&self.alignment, &settings.guidelines)?;
        let wires = guidelines.cut_wires();
        let sheet = layout(&settings.layout, &wires, self.surface)?;

        info!(
            "corridor: {} stations, {} profiles",
            guidelines.pairs.len() + guidelines.failures.len(),
            sheet.profiles.len()
        );
        Ok(CorridorOutput { guidelines, sheet })
    }
}

/// Run a corridor job.
pub fn run<S: SurfaceIntersector + ?Sized>(
    alignment: AlignmentModel<'_>,
    surface: &S,
    settings: &CorridorSettings,
) -> Result<CorridorOutput> {
    Corridor::new(alignment, surface).run(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use trails_geom::{LineSegment, Point3};
    use trails_guideline::{StationRegion, StraightAlignment};

    /// Flat ground at z = 0 for `x <= max_x`, with no crossings.
    struct Ground {
        max_x: f64,
    }

    impl SurfaceIntersector for Ground {
        fn find_section_parameters(&self, _edge: &LineSegment) -> Vec<f64> {
            Vec::new()
        }

        fn project_points(&self, points: &[Point3]) -> Vec<Option<Point3>> {
            points
                .iter()
                .map(|p| (p.x <= self.max_x).then(|| Point3::new(p.x, p.y, 0.0)))
                .collect()
        }
    }

    fn line() -> StraightAlignment {
        StraightAlignment::new(Point3::origin(), Point3::new(100_000.0, 0.0, 0.0))
    }

    fn settings() -> CorridorSettings {
        let mut settings = CorridorSettings::default();
        settings.guidelines.intervals.tangent_increment = 25.0;
        settings
    }

    #[test]
    fn test_wire_failure_maps_to_station() {
        let line = line();
        let ground = Ground { max_x: 60_000.0 };
        let output = run(AlignmentModel::straight(&line), &ground, &settings()).unwrap();

        assert_eq!(output.guidelines.pairs.len(), 5);
        assert_eq!(output.sheet.profiles.len(), 3);
        let failed: Vec<f64> = output.failed_stations().into_iter().map(|(s, _)| s).collect();
        assert_eq!(failed, vec![75.0, 100.0]);
    }

    #[test]
    fn test_stations_match_guidelines() {
        let line = line();
        let ground = Ground { max_x: f64::MAX };
        let corridor = Corridor::new(AlignmentModel::straight(&line), &ground);
        let mut cfg = settings();
        cfg.guidelines.region = StationRegion::new(20.0, 60.0);

        let stations = corridor.stations(&cfg.guidelines).unwrap();
        assert_eq!(stations, vec![25.0, 50.0]);
        let output = corridor.run(&cfg).unwrap();
        assert_eq!(output.guidelines.stations(), stations);
        assert_eq!(output.station_of_wire(1), Some(50.0));
        assert_eq!(output.station_of_wire(2), None);
    }

    #[test]
    fn test_invalid_settings_abort() {
        let line = line();
        let ground = Ground { max_x: f64::MAX };
        let mut cfg = settings();
        cfg.layout.profile_width = 0.0;
        assert!(matches!(
            run(AlignmentModel::straight(&line), &ground, &cfg),
            Err(Error::Section(SectionError::InvalidLayout(_)))
        ));

        let mut cfg = settings();
        cfg.guidelines.region = StationRegion::new(50.0, 10.0);
        assert!(matches!(
            run(AlignmentModel::straight(&line), &ground, &cfg),
            Err(Error::Guideline(GuidelineError::InvalidRegion { .. }))
        ));
    }
}
