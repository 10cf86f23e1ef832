//! The reconciliation cycle.
//!
//! One cycle waits for a fresh day-schedule document, resolves the hour key,
//! reads the newest snapshot and document, compares the two quantities and
//! alerts on disagreement. Failures end the cycle without affecting the next.

mod compare;
mod cycle;
mod state;
mod wait;

pub use compare::{compare, Verdict};
pub use cycle::{EngineSettings, ReconciliationEngine};
pub use state::{CycleOutcome, CycleReport, CycleState};
pub use wait::{wait_for_document, WaitOutcome};

use crate::snapshot::SnapshotError;
use crate::timeseries::TimeSeriesError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CycleError {
    #[error("Missing source: no {kind} document in {directory}")]
    MissingSource { kind: &'static str, directory: String },

    #[error("Snapshot error: {0}")]
    SnapshotError(#[from] SnapshotError),

    #[error("Day-schedule error: {0}")]
    TimeSeriesError(#[from] TimeSeriesError),
}
