use super::compare::{compare, Verdict};
use super::state::{CycleOutcome, CycleReport, CycleState};
use super::wait::{wait_for_document, WaitOutcome};
use super::CycleError;
use crate::alert::{AlertSink, SourceRefs};
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, FlowcheckConfig};
use crate::hour::{self, HourKey};
use crate::shutdown::ShutdownListener;
use crate::snapshot::{read_snapshot, row_at};
use crate::timeseries::{quantity_for_label, read_document, DirectionLabels};
use crate::utils::latest_file;
use crate::watcher::FreshnessWatcher;
use chrono_tz::Tz;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

/// What the engine needs from configuration
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub snapshot_dir: PathBuf,
    pub timeseries_dir: PathBuf,
    pub snapshot_extension: String,
    pub timeseries_extension: String,
    pub tz: Tz,
    pub retry_interval: Duration,
    pub snapshot_header_rows: usize,
    pub direction_labels: DirectionLabels,
    pub idle_bell: bool,
}

impl EngineSettings {
    pub fn from_config(config: &FlowcheckConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            snapshot_dir: config.snapshot_dir.clone(),
            timeseries_dir: config.timeseries_dir.clone(),
            snapshot_extension: config.snapshot_extension.clone(),
            timeseries_extension: config.timeseries_extension.clone(),
            tz: config.tz()?,
            retry_interval: config.retry_interval(),
            snapshot_header_rows: config.snapshot_header_rows,
            direction_labels: config.direction_labels.clone(),
            idle_bell: config.idle_bell,
        })
    }
}

/// Runs reconciliation cycles one at a time.
///
/// Owns the freshness watcher, so "already seen" state lives exactly as long
/// as the engine.
pub struct ReconciliationEngine {
    settings: EngineSettings,
    watcher: FreshnessWatcher,
    sink: AlertSink,
    clock: Arc<dyn Clock>,
    state: CycleState,
}

impl ReconciliationEngine {
    pub fn new(settings: EngineSettings, sink: AlertSink) -> Self {
        let watcher = FreshnessWatcher::new(settings.timeseries_extension.clone());
        Self {
            settings,
            watcher,
            sink,
            clock: Arc::new(SystemClock),
            state: CycleState::Idle,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// State of the current or last cycle
    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Seen-set of the day-schedule directory; resetting it makes existing
    /// documents release the next wait
    pub fn watcher_mut(&mut self) -> &mut FreshnessWatcher {
        &mut self.watcher
    }

    fn transition(&mut self, next: CycleState) {
        debug!(from = %self.state, to = %next, "Cycle state change");
        self.state = next;
    }

    /// Run one full cycle: wait, resolve, fetch, compare, alert.
    ///
    /// Never returns an error; failures are reported in the outcome.
    pub async fn run_cycle(&mut self, shutdown: &mut ShutdownListener) -> CycleReport {
        let cycle_id = Uuid::new_v4();
        let span = info_span!("cycle", %cycle_id);
        self.run_cycle_inner(cycle_id, shutdown).instrument(span).await
    }

    async fn run_cycle_inner(&mut self, cycle_id: Uuid, shutdown: &mut ShutdownListener) -> CycleReport {
        self.transition(CycleState::WaitingForDocument);
        info!(directory = %self.settings.timeseries_dir.display(), "Waiting for a new day-schedule document");

        let new_documents = match wait_for_document(
            &mut self.watcher,
            &self.settings.timeseries_dir,
            self.settings.retry_interval,
            shutdown,
            self.settings.idle_bell,
        )
        .await
        {
            WaitOutcome::Ready(names) => names,
            WaitOutcome::Cancelled => {
                info!("Cycle cancelled while waiting");
                self.transition(CycleState::Cancelled);
                return CycleReport {
                    cycle_id,
                    new_documents: Vec::new(),
                    hour_key: None,
                    outcome: CycleOutcome::Cancelled,
                };
            }
        };

        self.transition(CycleState::ResolvingHour);
        let key = hour::resolve(self.clock.now(), self.settings.tz);
        info!(hour = %key.hour_label, row = key.row_index, business_day = %key.business_day, "Running validation");

        let outcome = self.fetch_and_compare(&key).await;
        self.transition(outcome.state());

        CycleReport {
            cycle_id,
            new_documents,
            hour_key: Some(key),
            outcome,
        }
    }

    async fn fetch_and_compare(&mut self, key: &HourKey) -> CycleOutcome {
        self.transition(CycleState::FetchingValues);

        let refs = match self.latest_sources() {
            Ok(refs) => refs,
            Err(e) => {
                error!("Cycle failed: {}", e);
                return CycleOutcome::Failed(e);
            }
        };

        let verdict = match self.reconcile_files(key, &refs).await {
            Ok(verdict) => verdict,
            Err(e) => {
                error!(
                    snapshot = %refs.snapshot_path.display(),
                    timeseries = %refs.timeseries_path.display(),
                    "Error during validation: {}",
                    e
                );
                return CycleOutcome::Failed(e);
            }
        };

        self.transition(CycleState::Comparing);
        match verdict {
            Verdict::Matched { value } => {
                info!(hour = %key.hour_label, value, "Match");
                CycleOutcome::Matched { value }
            }
            Verdict::Mismatched(event) => {
                let alert = self.sink.notify(&event).await;
                CycleOutcome::Mismatched { event, alert }
            }
        }
    }

    /// Newest snapshot and newest day-schedule document
    pub fn latest_sources(&self) -> Result<SourceRefs, CycleError> {
        let snapshot_path = newest(&self.settings.snapshot_dir, &self.settings.snapshot_extension, "snapshot")?;
        let timeseries_path = newest(
            &self.settings.timeseries_dir,
            &self.settings.timeseries_extension,
            "day-schedule",
        )?;

        Ok(SourceRefs {
            snapshot_path,
            timeseries_path,
        })
    }

    /// Read both documents and compare the quantities for `key`.
    ///
    /// The snapshot row's direction label selects the day-schedule series.
    pub async fn reconcile_files(&self, key: &HourKey, refs: &SourceRefs) -> Result<Verdict, CycleError> {
        let snapshot = read_snapshot(&refs.snapshot_path, self.settings.snapshot_header_rows).await?;
        let row = row_at(key.row_index as usize, &snapshot)?;

        let document = read_document(&refs.timeseries_path).await?;
        let observed = quantity_for_label(
            &row.direction,
            &self.settings.direction_labels,
            key.row_index,
            &document,
        )?;

        info!(
            direction = %row.direction,
            snapshot_value = row.quantity,
            timeseries_value = observed,
            "Fetched values"
        );

        Ok(compare(&row, observed, key, refs, self.clock.now()))
    }
}

fn newest(directory: &Path, extension: &str, kind: &'static str) -> Result<PathBuf, CycleError> {
    latest_file(directory, extension).ok_or_else(|| CycleError::MissingSource {
        kind,
        directory: directory.display().to_string(),
    })
}
