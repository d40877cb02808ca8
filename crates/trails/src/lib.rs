#![warn(missing_docs)]

//! Corridor cross-section engine.
//!
//! Ties the pieces together: sample stations along an alignment, build a
//! transverse guideline at each, cut the terrain under every guideline, and
//! tile the flattened sections on a drawing sheet.
//!
//! # Example
//!
//! ```
//! use trails::{run, AlignmentModel, CorridorSettings, StraightAlignment, TerrainMesh};
//! use trails::geom::Point3;
//!
//! #[rustfmt::skip]
//! let vertices = [
//!     -1000.0, -30000.0, 0.0,
//!     101000.0, -30000.0, 0.0,
//!     101000.0, 30000.0, 0.0,
//!     -1000.0, 30000.0, 0.0,
//! ];
//! let terrain = TerrainMesh::from_flat(&vertices, &[0, 1, 2, 0, 2, 3]).unwrap();
//! let line = StraightAlignment::new(Point3::origin(), Point3::new(100_000.0, 0.0, 0.0));
//!
//! let settings = CorridorSettings::default();
//! let output = run(AlignmentModel::straight(&line), &terrain, &settings).unwrap();
//! assert_eq!(output.sheet.profiles.len(), output.guidelines.pairs.len());
//! ```

pub use trails_geom as geom;
pub use trails_guideline as guideline;
pub use trails_section as section;

pub mod error;
pub mod pipeline;
pub mod tracker;

pub use error::{Error, Result};
pub use pipeline::{run, Corridor, CorridorOutput, CorridorSettings};
pub use tracker::{DragTracker, Tracker, TrackerObserver, WireTracker};
pub use trails_guideline::{
    AlignmentElement, AlignmentEvaluator, AlignmentModel, GuidelineSettings, Guidelines,
    PiecewiseAlignment, StraightAlignment,
};
pub use trails_section::{CutWire, LayoutConfig, SheetLayout, SurfaceIntersector, TerrainMesh};
