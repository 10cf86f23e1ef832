mod common;

use async_trait::async_trait;
use common::{
    create_workspace, engine_settings, london, schedule_xml, snapshot_csv, write_aged, Workspace,
};
use flowcheck_daemon::alert::{AlertChannel, AlertError, AlertSink, MismatchEvent, SourceRefs};
use flowcheck_daemon::clock::ManualClock;
use flowcheck_daemon::engine::{CycleError, CycleOutcome, CycleState, ReconciliationEngine, Verdict};
use flowcheck_daemon::hour::resolve;
use flowcheck_daemon::shutdown::{shutdown_channel, ShutdownSignal};
use flowcheck_daemon::snapshot::SnapshotError;
use flowcheck_daemon::timeseries::TimeSeriesError;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every event it is asked to deliver
#[derive(Default)]
struct RecordingChannel {
    events: Mutex<Vec<MismatchEvent>>,
}

#[async_trait]
impl AlertChannel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, event: &MismatchEvent) -> Result<(), AlertError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Engine whose clock reads 02:45 London, which resolves to row 5
fn engine_for(ws: &Workspace) -> (ReconciliationEngine, Arc<RecordingChannel>) {
    let recorder = Arc::new(RecordingChannel::default());
    let mut sink = AlertSink::new();
    sink.add_channel(recorder.clone());

    let clock = Arc::new(ManualClock::new(london(2024, 1, 15, 2, 45)));
    let engine = ReconciliationEngine::new(engine_settings(ws), sink).with_clock(clock);
    (engine, recorder)
}

#[tokio::test]
async fn test_matching_values_end_in_matched() {
    let ws = create_workspace();
    write_aged(&ws.snapshot_dir, "rnp_at_1.csv", &snapshot_csv(&[(5, "500", "A_TO_B")]), 0);
    write_aged(
        &ws.timeseries_dir,
        "ds_1.xml",
        &schedule_xml(&[(0, 100), (21600, 500), (25200, 900)], &[(0, 0)]),
        0,
    );

    let (mut engine, recorder) = engine_for(&ws);
    let (_tx, mut shutdown) = shutdown_channel();

    let report = engine.run_cycle(&mut shutdown).await;

    let key = report.hour_key.expect("Hour should be resolved");
    assert_eq!(key.row_index, 5);
    assert_eq!(key.hour_label, "04:00 - 05:00");
    assert_eq!(report.new_documents, vec!["ds_1.xml".to_string()]);
    assert!(matches!(report.outcome, CycleOutcome::Matched { value: 500 }));
    assert_eq!(engine.state(), CycleState::Matched);
    assert!(engine.state().is_terminal());
    assert!(recorder.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_different_values_end_in_mismatched_and_alert() {
    let ws = create_workspace();
    let snapshot = write_aged(&ws.snapshot_dir, "rnp_at_1.csv", &snapshot_csv(&[(5, "500", "A_TO_B")]), 0);
    let document = write_aged(
        &ws.timeseries_dir,
        "ds_1.xml",
        &schedule_xml(&[(0, 100), (21600, 400)], &[(0, 500)]),
        0,
    );

    let (mut engine, recorder) = engine_for(&ws);
    let (_tx, mut shutdown) = shutdown_channel();

    let report = engine.run_cycle(&mut shutdown).await;

    match report.outcome {
        CycleOutcome::Mismatched { event, alert } => {
            assert_eq!(event.expected_value, 500);
            assert_eq!(event.observed_value, 400);
            assert_eq!(event.hour_label, "04:00 - 05:00");
            assert_eq!(event.source_refs.snapshot_path, snapshot);
            assert_eq!(event.source_refs.timeseries_path, document);
            assert_eq!(alert.delivered, vec!["recording".to_string()]);
        }
        other => panic!("Expected mismatch, got {:?}", other),
    }
    assert_eq!(engine.state(), CycleState::Mismatched);
    assert!(engine.state().is_terminal());
    assert_eq!(recorder.events.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_configured_labels_select_series() {
    let ws = create_workspace();
    write_aged(&ws.snapshot_dir, "rnp_at_1.csv", &snapshot_csv(&[(5, "1,250.0", "GBFR")]), 0);
    write_aged(
        &ws.timeseries_dir,
        "ds_1.xml",
        &schedule_xml(&[(0, 0)], &[(0, 1250)]),
        0,
    );

    let (mut engine, _) = engine_for(&ws);
    let (_tx, mut shutdown) = shutdown_channel();

    let report = engine.run_cycle(&mut shutdown).await;
    assert!(matches!(report.outcome, CycleOutcome::Matched { value: 1250 }));
}

#[tokio::test]
async fn test_missing_snapshot_fails_cycle() {
    let ws = create_workspace();
    write_aged(&ws.timeseries_dir, "ds_1.xml", &schedule_xml(&[(0, 1)], &[(0, 1)]), 0);

    let (mut engine, recorder) = engine_for(&ws);
    let (_tx, mut shutdown) = shutdown_channel();

    let report = engine.run_cycle(&mut shutdown).await;

    assert!(matches!(
        report.outcome,
        CycleOutcome::Failed(CycleError::MissingSource { kind: "snapshot", .. })
    ));
    assert_eq!(engine.state(), CycleState::Failed);
    assert!(engine.state().is_terminal());
    assert!(recorder.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_direction_fails_cycle() {
    let ws = create_workspace();
    write_aged(&ws.snapshot_dir, "rnp_at_1.csv", &snapshot_csv(&[(5, "500", "SIDEWAYS")]), 0);
    write_aged(&ws.timeseries_dir, "ds_1.xml", &schedule_xml(&[(0, 500)], &[(0, 500)]), 0);

    let (mut engine, _) = engine_for(&ws);
    let (_tx, mut shutdown) = shutdown_channel();

    let report = engine.run_cycle(&mut shutdown).await;
    assert!(matches!(
        report.outcome,
        CycleOutcome::Failed(CycleError::TimeSeriesError(TimeSeriesError::InvalidDirection(_)))
    ));
}

#[tokio::test]
async fn test_unparseable_quantity_fails_cycle() {
    let ws = create_workspace();
    write_aged(&ws.snapshot_dir, "rnp_at_1.csv", &snapshot_csv(&[(5, "--", "A_TO_B")]), 0);
    write_aged(&ws.timeseries_dir, "ds_1.xml", &schedule_xml(&[(0, 500)], &[(0, 500)]), 0);

    let (mut engine, _) = engine_for(&ws);
    let (_tx, mut shutdown) = shutdown_channel();

    let report = engine.run_cycle(&mut shutdown).await;
    assert!(matches!(
        report.outcome,
        CycleOutcome::Failed(CycleError::SnapshotError(SnapshotError::ColumnFormatError { .. }))
    ));
}

#[tokio::test]
async fn test_no_sample_before_target_fails_cycle() {
    let ws = create_workspace();
    write_aged(&ws.snapshot_dir, "rnp_at_1.csv", &snapshot_csv(&[(5, "500", "A_TO_B")]), 0);
    write_aged(&ws.timeseries_dir, "ds_1.xml", &schedule_xml(&[(30000, 500)], &[(0, 500)]), 0);

    let (mut engine, _) = engine_for(&ws);
    let (_tx, mut shutdown) = shutdown_channel();

    let report = engine.run_cycle(&mut shutdown).await;
    assert!(matches!(
        report.outcome,
        CycleOutcome::Failed(CycleError::TimeSeriesError(
            TimeSeriesError::NoApplicableSample { hour_index: 5, .. }
        ))
    ));
}

#[tokio::test]
async fn test_newest_documents_are_used() {
    let ws = create_workspace();
    write_aged(&ws.snapshot_dir, "rnp_at_old.csv", &snapshot_csv(&[(5, "1", "A_TO_B")]), 600);
    let snapshot = write_aged(&ws.snapshot_dir, "rnp_at_new.csv", &snapshot_csv(&[(5, "500", "A_TO_B")]), 10);
    write_aged(&ws.timeseries_dir, "ds_new.xml", &schedule_xml(&[(0, 500)], &[(0, 0)]), 5);
    write_aged(&ws.timeseries_dir, "ds_old.xml", &schedule_xml(&[(0, 1)], &[(0, 0)]), 900);
    // A snapshot still being written is never picked up
    write_aged(&ws.snapshot_dir, "rnp_at_partial.csv.tmp", "garbage", 0);

    let (mut engine, _) = engine_for(&ws);
    let refs = engine.latest_sources().expect("Both sources exist");
    assert_eq!(refs.snapshot_path, snapshot);

    let (_tx, mut shutdown) = shutdown_channel();
    let report = engine.run_cycle(&mut shutdown).await;
    assert!(matches!(report.outcome, CycleOutcome::Matched { value: 500 }));
}

#[tokio::test]
async fn test_reconcile_files_is_repeatable() {
    let ws = create_workspace();
    let snapshot_path = write_aged(&ws.snapshot_dir, "rnp.csv", &snapshot_csv(&[(5, "500", "A_TO_B")]), 0);
    let timeseries_path = write_aged(&ws.timeseries_dir, "ds.xml", &schedule_xml(&[(21600, 400)], &[(0, 0)]), 0);

    let (engine, _) = engine_for(&ws);
    let key = resolve(london(2024, 1, 15, 2, 45), chrono_tz::Europe::London);
    let refs = SourceRefs {
        snapshot_path,
        timeseries_path,
    };

    let first = engine.reconcile_files(&key, &refs).await.expect("Should reconcile");
    let second = engine.reconcile_files(&key, &refs).await.expect("Should reconcile");
    assert_eq!(first, second);
    match first {
        Verdict::Mismatched(event) => {
            assert_eq!(event.expected_value, 500);
            assert_eq!(event.observed_value, 400);
        }
        other => panic!("Expected mismatch, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_next_cycle_waits_for_a_new_document() {
    let ws = create_workspace();
    write_aged(&ws.snapshot_dir, "rnp_at_1.csv", &snapshot_csv(&[(5, "500", "A_TO_B")]), 0);
    write_aged(&ws.timeseries_dir, "ds_1.xml", &schedule_xml(&[(0, 500)], &[(0, 0)]), 0);

    let (mut engine, _) = engine_for(&ws);
    let (tx, mut shutdown) = shutdown_channel();

    let first = engine.run_cycle(&mut shutdown).await;
    assert!(matches!(first.outcome, CycleOutcome::Matched { .. }));

    // Nothing new arrives, so the second cycle only ends through shutdown.
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(300)).await;
        tx.send(ShutdownSignal::Shutdown).unwrap();
    });

    let second = engine.run_cycle(&mut shutdown).await;
    assert!(matches!(second.outcome, CycleOutcome::Cancelled));
    assert!(second.hour_key.is_none());
    assert_eq!(engine.state(), CycleState::Cancelled);
    assert!(engine.state().is_terminal());
}

#[tokio::test]
async fn test_engine_starts_idle() {
    let ws = create_workspace();
    let (engine, _) = engine_for(&ws);
    assert_eq!(engine.state(), CycleState::Idle);
    assert!(!engine.state().is_terminal());
}

#[tokio::test]
async fn test_reset_watcher_reconciles_the_same_document_again() {
    let ws = create_workspace();
    write_aged(&ws.snapshot_dir, "rnp_at_1.csv", &snapshot_csv(&[(5, "500", "A_TO_B")]), 0);
    write_aged(&ws.timeseries_dir, "ds_1.xml", &schedule_xml(&[(0, 500)], &[(0, 0)]), 0);

    let (mut engine, _) = engine_for(&ws);
    let (_tx, mut shutdown) = shutdown_channel();

    let first = engine.run_cycle(&mut shutdown).await;
    assert!(matches!(first.outcome, CycleOutcome::Matched { value: 500 }));
    assert_eq!(engine.watcher_mut().seen_count(), 1);

    engine.watcher_mut().reset();

    let second = engine.run_cycle(&mut shutdown).await;
    assert_eq!(second.new_documents, vec!["ds_1.xml".to_string()]);
    assert!(matches!(second.outcome, CycleOutcome::Matched { value: 500 }));
}

#[tokio::test(start_paused = true)]
async fn test_failed_cycle_does_not_block_the_next() {
    let ws = create_workspace();
    write_aged(&ws.timeseries_dir, "ds_1.xml", &schedule_xml(&[(0, 500)], &[(0, 0)]), 0);

    let (mut engine, _) = engine_for(&ws);
    let (_tx, mut shutdown) = shutdown_channel();

    let first = engine.run_cycle(&mut shutdown).await;
    assert!(matches!(first.outcome, CycleOutcome::Failed(_)));

    write_aged(&ws.snapshot_dir, "rnp_at_1.csv", &snapshot_csv(&[(5, "500", "A_TO_B")]), 0);
    write_aged(&ws.timeseries_dir, "ds_2.xml", &schedule_xml(&[(0, 500)], &[(0, 0)]), 0);

    let second = engine.run_cycle(&mut shutdown).await;
    assert_eq!(second.new_documents, vec!["ds_2.xml".to_string()]);
    assert!(matches!(second.outcome, CycleOutcome::Matched { value: 500 }));
}
