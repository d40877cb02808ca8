#![warn(missing_docs)]

//! Station sampling and transverse guidelines along a corridor alignment.
//!
//! An alignment is either a [`PiecewiseAlignment`] of typed elements
//! (tangents, curves, spirals) or a [`StraightAlignment`] fallback. Both are
//! wrapped in an [`AlignmentModel`] for sampling and evaluation.
//!
//! Stations are in metres. Lengths and coordinates are in model units
//! (millimetres); see [`units`] for the conversions.
//!
//! # Example
//!
//! ```ignore
//! use trails_guideline::{generate, AlignmentModel, GuidelineSettings, StraightAlignment};
//!
//! let line = StraightAlignment::new(start, end);
//! let guidelines = generate(&AlignmentModel::straight(&line), &GuidelineSettings::default())?;
//! let wires = guidelines.cut_wires();
//! ```

pub mod alignment;
pub mod error;
pub mod guideline;
pub mod stations;
pub mod units;

pub use alignment::{
    AlignmentElement, AlignmentEvaluator, AlignmentMeta, AlignmentModel, ElementKind,
    PiecewiseAlignment, StraightAlignment,
};
pub use error::{GuidelineError, Result};
pub use guideline::{generate, guideline_at, GuidelineSettings, Guidelines, OffsetPair, Offsets};
pub use stations::{
    filter_region, region_stations, sample_piecewise, sample_straight, IntervalSpec,
    StationRegion,
};
