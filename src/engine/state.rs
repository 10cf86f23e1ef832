use super::CycleError;
use crate::alert::{AlertReport, MismatchEvent};
use crate::hour::HourKey;
use std::fmt;
use uuid::Uuid;

/// Where the engine is within a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    WaitingForDocument,
    ResolvingHour,
    FetchingValues,
    Comparing,
    Matched,
    Mismatched,
    Failed,
    Cancelled,
}

impl CycleState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CycleState::Matched | CycleState::Mismatched | CycleState::Failed | CycleState::Cancelled
        )
    }
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CycleState::Idle => "idle",
            CycleState::WaitingForDocument => "waiting_for_document",
            CycleState::ResolvingHour => "resolving_hour",
            CycleState::FetchingValues => "fetching_values",
            CycleState::Comparing => "comparing",
            CycleState::Matched => "matched",
            CycleState::Mismatched => "mismatched",
            CycleState::Failed => "failed",
            CycleState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// How a cycle ended
#[derive(Debug)]
pub enum CycleOutcome {
    Matched { value: i64 },
    Mismatched { event: MismatchEvent, alert: AlertReport },
    Failed(CycleError),
    /// Shutdown arrived while waiting for a document
    Cancelled,
}

impl CycleOutcome {
    pub fn state(&self) -> CycleState {
        match self {
            CycleOutcome::Matched { .. } => CycleState::Matched,
            CycleOutcome::Mismatched { .. } => CycleState::Mismatched,
            CycleOutcome::Failed(_) => CycleState::Failed,
            CycleOutcome::Cancelled => CycleState::Cancelled,
        }
    }
}

/// Everything a finished cycle produced
#[derive(Debug)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    /// New documents that released the wait
    pub new_documents: Vec<String>,
    /// `None` when the cycle was cancelled before resolving
    pub hour_key: Option<HourKey>,
    pub outcome: CycleOutcome,
}
