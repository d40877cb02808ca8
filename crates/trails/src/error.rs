//! Error type for corridor jobs.

use thiserror::Error;
use trails_guideline::GuidelineError;
use trails_section::SectionError;

/// Errors that abort a corridor job.
///
/// Per-station and per-wire failures do not abort a job; they are collected
/// in [`CorridorOutput`](crate::CorridorOutput).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Station sampling or guideline settings failed.
    #[error(transparent)]
    Guideline(#[from] GuidelineError),

    /// Section extraction or layout settings failed.
    #[error(transparent)]
    Section(#[from] SectionError),
}

/// Result type for corridor jobs.
pub type Result<T> = std::result::Result<T, Error>;
