#![warn(missing_docs)]

//! Terrain cross-sections for corridor drafting.
//!
//! This crate turns transverse cut-wires into drawable cross-sections:
//!
//! - **Extraction**: sample each cut-wire where it crosses the terrain and
//!   drop the samples vertically onto the surface ([`extract`]).
//! - **Flattening**: unroll a 3D section into a (slope distance, elevation)
//!   profile ([`convert`]).
//! - **Layout**: tile the flattened profiles on a drawing sheet in a
//!   roughly square grid ([`layout`]).
//!
//! Surface queries go through the [`SurfaceIntersector`] trait.
//! [`TerrainMesh`] implements it for triangulated terrain.
//!
//! # Example
//!
//! ```ignore
//! use trails_section::{layout, CutWire, LayoutConfig, TerrainMesh};
//!
//! let terrain = TerrainMesh::from_flat(&vertices, &indices)?;
//! let sheet = layout(&LayoutConfig::default(), &wires, &terrain)?;
//! for profile in &sheet.profiles {
//!     println!("wire {}: {} segments", profile.wire, profile.segments.len());
//! }
//! ```

pub mod convert;
pub mod error;
pub mod extract;
pub mod layout;
pub mod surface;
pub mod terrain;

pub use convert::convert;
pub use error::{Result, SectionError};
pub use extract::{
    extract, extract_compound, extract_wire, sample_wire, Section3d, SectionSet, ENDPOINT_INSET,
};
pub use layout::{
    layout, place_wire, profiles_per_column, sheet_positions, LayoutConfig, SectionProfile2D,
    SheetCursor, SheetLayout,
};
pub use surface::{CutWire, SurfaceIntersector};
pub use terrain::{TerrainMesh, TerrainTriangle};
