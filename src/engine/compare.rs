use crate::alert::{MismatchEvent, SourceRefs};
use crate::hour::HourKey;
use crate::snapshot::SnapshotRow;
use chrono::{DateTime, Utc};

/// Result of comparing the two quantities for one hour
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Matched { value: i64 },
    Mismatched(MismatchEvent),
}

/// Compare the snapshot row against the day-schedule quantity.
///
/// Depends only on its arguments.
pub fn compare(
    row: &SnapshotRow,
    observed: i64,
    key: &HourKey,
    refs: &SourceRefs,
    detected_at: DateTime<Utc>,
) -> Verdict {
    if row.quantity == observed {
        return Verdict::Matched {
            value: row.quantity,
        };
    }

    Verdict::Mismatched(MismatchEvent {
        expected_value: row.quantity,
        observed_value: observed,
        hour_label: key.hour_label.clone(),
        direction: row.direction.clone(),
        source_refs: refs.clone(),
        detected_at,
    })
}
