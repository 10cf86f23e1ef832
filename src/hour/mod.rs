//! Hour keys for a reconciliation cycle.
//!
//! The display label runs two hours ahead of local time, and the snapshot row
//! runs one hour ahead of the label. The two offsets are kept separate because
//! the portal and the day-schedule feed number hours differently.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Timelike};
use chrono_tz::Tz;
use std::fmt;

/// Hours between local time and the labelled delivery hour
pub const LABEL_OFFSET_HOURS: u32 = 2;

/// Hours between the labelled delivery hour and the snapshot row
pub const ROW_OFFSET_HOURS: u32 = 1;

/// Local hour from which the business day is the next calendar day
pub const ROLLOVER_HOUR: u32 = 21;

/// Keys for one cycle, fixed once resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourKey {
    /// e.g. `"14:00 - 15:00"`
    pub hour_label: String,
    /// Snapshot row and time-series hour index, 0-23
    pub row_index: u32,
    pub business_day: NaiveDate,
    /// Whether `business_day` is the day after the local date
    pub rollover: bool,
    pub local_hour: u32,
}

impl fmt::Display for HourKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (row {}, business day {})",
            self.hour_label, self.row_index, self.business_day
        )
    }
}

/// Resolve the hour key for `now` as seen in `tz`
pub fn resolve<T: TimeZone>(now: DateTime<T>, tz: Tz) -> HourKey {
    let local = now.with_timezone(&tz);
    let local_hour = local.hour();

    let effective_hour = (local_hour + LABEL_OFFSET_HOURS) % 24;
    let hour_label = format!("{:02}:00 - {:02}:00", effective_hour, effective_hour + 1);
    let row_index = (effective_hour + ROW_OFFSET_HOURS) % 24;

    let local_date = local.date_naive();
    let rollover = local_hour >= ROLLOVER_HOUR;
    let business_day = if rollover {
        local_date
            .checked_add_days(Days::new(1))
            .unwrap_or(local_date)
    } else {
        local_date
    };

    HourKey {
        hour_label,
        row_index,
        business_day,
        rollover,
        local_hour,
    }
}

/// Day-of-month of the business day, as the portal's date picker shows it
pub fn business_day_of_month(key: &HourKey) -> u32 {
    key.business_day.day()
}
