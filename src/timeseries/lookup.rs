use super::types::{Direction, DirectionLabels, TimeSeriesDocument};
use super::TimeSeriesError;

const SECONDS_PER_HOUR: i64 = 3600;

/// Quantity in effect at the end of hour `hour_index` for a direction.
///
/// The target is `(hour_index + 1) * 3600` seconds from midnight. Samples are
/// scanned in document order and the last one at or before the target wins;
/// the scan stops at the first sample past the target.
pub fn quantity_at(
    direction: Direction,
    hour_index: u32,
    document: &TimeSeriesDocument,
) -> Result<i64, TimeSeriesError> {
    let target_seconds = (i64::from(hour_index) + 1) * SECONDS_PER_HOUR;

    let mut found = None;
    for sample in &document.series(direction).samples {
        if sample.position > target_seconds {
            break;
        }
        found = Some(sample.quantity);
    }

    found.ok_or(TimeSeriesError::NoApplicableSample {
        hour_index,
        target_seconds,
    })
}

/// Same as [`quantity_at`], with the direction given as a portal label
pub fn quantity_for_label(
    label: &str,
    labels: &DirectionLabels,
    hour_index: u32,
    document: &TimeSeriesDocument,
) -> Result<i64, TimeSeriesError> {
    let direction = Direction::from_label(label, labels)?;
    quantity_at(direction, hour_index, document)
}
