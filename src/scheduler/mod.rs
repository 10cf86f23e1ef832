//! Hourly driver: capture a snapshot, then run one reconciliation cycle.

use crate::engine::{CycleReport, ReconciliationEngine};
use crate::hour::{self, business_day_of_month};
use crate::shutdown::ShutdownListener;
use crate::snapshot::{write_snapshot, SnapshotSource};
use chrono::{DateTime, NaiveDate, Offset, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Identifies one scheduled run; a DST change gives the repeated hour a new key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickKey {
    pub local_date: NaiveDate,
    pub local_hour: u32,
    pub utc_offset_secs: i32,
}

impl TickKey {
    pub fn at(now: DateTime<Utc>, tz: Tz) -> Self {
        let local = now.with_timezone(&tz);
        Self {
            local_date: local.date_naive(),
            local_hour: local.hour(),
            utc_offset_secs: local.offset().fix().local_minus_utc(),
        }
    }
}

/// Next instant after `now` whose local minute in `tz` equals `minute`.
///
/// Always strictly in the future and at second zero.
pub fn next_fire(now: DateTime<Utc>, tz: Tz, minute: u32) -> DateTime<Utc> {
    let secs = now.timestamp();
    let start = secs - secs.rem_euclid(60) + 60;

    // Zone offsets are whole multiples of 15 minutes, so the target minute
    // turns up within the next hour.
    for step in 0..=60 {
        if let Some(candidate) = Utc.timestamp_opt(start + step * 60, 0).single() {
            if candidate.with_timezone(&tz).minute() == minute {
                return candidate;
            }
        }
    }

    now + chrono::Duration::hours(1)
}

#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub minute: u32,
    pub settle_delay: Duration,
}

/// Runs the producer and the engine once per hour
pub struct Scheduler {
    engine: ReconciliationEngine,
    source: Arc<dyn SnapshotSource>,
    settings: SchedulerSettings,
    last_tick: Option<TickKey>,
}

impl Scheduler {
    pub fn new(
        engine: ReconciliationEngine,
        source: Arc<dyn SnapshotSource>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            engine,
            source,
            settings,
            last_tick: None,
        }
    }

    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }

    /// Loop until shutdown, then release the snapshot source
    pub async fn run(mut self, mut shutdown: ShutdownListener) {
        let tz = self.engine.settings().tz;
        let clock = self.engine.clock();

        loop {
            let now = clock.now();
            let fire_at = next_fire(now, tz, self.settings.minute);
            let wait = (fire_at - now).to_std().unwrap_or_default();

            info!(next = %fire_at.with_timezone(&tz), "Next cycle scheduled");
            if shutdown.sleep(wait).await {
                break;
            }

            if let Some(report) = self.tick(&mut shutdown).await {
                debug!(cycle_id = %report.cycle_id, outcome = %report.outcome.state(), "Cycle finished");
            }

            if shutdown.is_shutdown() {
                break;
            }
        }

        self.finish().await;
    }

    /// Run one scheduled tick: capture and persist a snapshot, then reconcile.
    ///
    /// Returns `None` when the tick was skipped, either because this hour
    /// already ran, the capture failed, or a shutdown arrived first.
    pub async fn tick(&mut self, shutdown: &mut ShutdownListener) -> Option<CycleReport> {
        let tz = self.engine.settings().tz;
        let now = self.engine.clock().now();

        let tick_key = TickKey::at(now, tz);
        if self.last_tick == Some(tick_key) {
            debug!(?tick_key, "Tick already ran this hour");
            return None;
        }
        self.last_tick = Some(tick_key);

        let key = hour::resolve(now, tz);
        if key.rollover {
            info!(
                business_day = %key.business_day,
                day_of_month = business_day_of_month(&key),
                "Business day set to next day"
            );
        }

        info!(source = self.source.name(), at = %now.with_timezone(&tz).format("%H:%M:%S"), "Triggering scrape");
        match self.source.capture(key.business_day).await {
            Ok(Some(rows)) if rows.is_empty() => {
                warn!("No data extracted");
                return None;
            }
            Ok(Some(rows)) => {
                match write_snapshot(&self.engine.settings().snapshot_dir, &rows, now).await {
                    Ok(path) => info!(path = %path.display(), rows = rows.len(), "Snapshot saved"),
                    Err(e) => {
                        error!("Failed to save snapshot: {}", e);
                        return None;
                    }
                }
            }
            Ok(None) => {}
            Err(e) => {
                error!("Scraping failed: {}", e);
                return None;
            }
        }

        if shutdown.sleep(self.settings.settle_delay).await {
            return None;
        }

        Some(self.engine.run_cycle(shutdown).await)
    }

    /// Release the snapshot source
    pub async fn finish(self) {
        info!(source = self.source.name(), "Closing snapshot source");
        self.source.shutdown().await;
    }
}
