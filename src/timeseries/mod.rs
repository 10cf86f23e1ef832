//! Day-schedule documents and "value in effect at time T" lookups.
//!
//! A day-schedule document carries two series of `(position, quantity)` points,
//! where `position` counts seconds from midnight. The value for an hour is the
//! last point at or before the end of that hour (a step function).

mod lookup;
mod parse;
mod types;

pub use lookup::{quantity_at, quantity_for_label};
pub use parse::{parse_document, read_document, SCHEDULE_NAMESPACE};
pub use types::{Direction, DirectionLabels, Sample, Series, TimeSeriesDocument};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimeSeriesError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("XML error: {0}")]
    XmlError(#[from] roxmltree::Error),

    #[error("Invalid direction: {0}")]
    InvalidDirection(String),

    #[error("No valid quantity found for hour {hour_index} at {target_seconds}s")]
    NoApplicableSample { hour_index: u32, target_seconds: i64 },

    #[error("Expected 2 TimeSeries elements, found {0}")]
    UnexpectedSeriesCount(usize),

    #[error("Malformed document: {0}")]
    Malformed(String),
}
