use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Files a verdict was computed from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRefs {
    pub snapshot_path: PathBuf,
    pub timeseries_path: PathBuf,
}

/// A disagreement between the snapshot and the day-schedule document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MismatchEvent {
    /// Value from the nomination snapshot
    pub expected_value: i64,
    /// Value from the day-schedule document
    pub observed_value: i64,
    pub hour_label: String,
    pub direction: String,
    pub source_refs: SourceRefs,
    pub detected_at: DateTime<Utc>,
}

impl MismatchEvent {
    pub fn subject(&self) -> String {
        format!("[ALERT] Flow mismatch at {}", self.hour_label)
    }

    /// Operator-facing message body
    pub fn message(&self) -> String {
        format!(
            "Flow mismatch detected\n\
             \n\
             Time-Frame: {}\n\
             Direction: {}\n\
             Snapshot flow value: {}\n\
             Day-schedule quantity: {}\n\
             \n\
             Snapshot file: {}\n\
             Day-schedule file: {}\n\
             \n\
             Please investigate manually. Suggested correct flow value based on snapshot = {}",
            self.hour_label,
            self.direction,
            self.expected_value,
            self.observed_value,
            self.source_refs.snapshot_path.display(),
            self.source_refs.timeseries_path.display(),
            self.expected_value,
        )
    }
}

/// A channel that could not deliver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelFailure {
    pub channel: String,
    pub error: String,
}

/// Per-channel outcome of one notification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertReport {
    pub delivered: Vec<String>,
    pub failed: Vec<ChannelFailure>,
}

impl AlertReport {
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}
