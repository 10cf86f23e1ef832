#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Europe::London;
use flowcheck_daemon::config::FlowcheckConfig;
use flowcheck_daemon::engine::EngineSettings;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Snapshot and day-schedule directories inside a temp dir
pub struct Workspace {
    pub root: TempDir,
    pub snapshot_dir: PathBuf,
    pub timeseries_dir: PathBuf,
}

pub fn create_workspace() -> Workspace {
    let root = create_test_dir();
    let snapshot_dir = root.path().join("rnp_files");
    let timeseries_dir = root.path().join("ds_files");
    std::fs::create_dir_all(&snapshot_dir).expect("Should create snapshot dir");
    std::fs::create_dir_all(&timeseries_dir).expect("Should create ds dir");
    Workspace {
        root,
        snapshot_dir,
        timeseries_dir,
    }
}

/// Engine settings pointing at the workspace, one-minute polling
pub fn engine_settings(ws: &Workspace) -> EngineSettings {
    let config = FlowcheckConfig {
        snapshot_dir: ws.snapshot_dir.clone(),
        timeseries_dir: ws.timeseries_dir.clone(),
        ..Default::default()
    };
    EngineSettings::from_config(&config).expect("Default config should be valid")
}

/// 24 snapshot rows with every hour at 0 in direction A_TO_B, except `overrides`
pub fn snapshot_csv(overrides: &[(usize, &str, &str)]) -> String {
    let mut out = String::new();
    for hour in 0..24 {
        let (quantity, direction) = overrides
            .iter()
            .find(|(h, _, _)| *h == hour)
            .map(|(_, q, d)| (q.to_string(), d.to_string()))
            .unwrap_or_else(|| ("0".to_string(), "A_TO_B".to_string()));
        out.push_str(&format!(
            "{:02}:00 - {:02}:00,IFA,Firm,\"{}\",{}\n",
            hour,
            hour + 1,
            quantity,
            direction
        ));
    }
    out
}

/// Day-schedule XML with the given A_TO_B and B_TO_A points
pub fn schedule_xml(a_to_b: &[(i64, i64)], b_to_a: &[(i64, i64)]) -> String {
    let series = |points: &[(i64, i64)]| {
        let mut s = String::from("<TimeSeries><mRID>1</mRID><Period>");
        for (position, quantity) in points {
            s.push_str(&format!(
                "<Point><position>{}</position><quantity>{}</quantity></Point>",
                position, quantity
            ));
        }
        s.push_str("</Period></TimeSeries>");
        s
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Schedule_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-2:scheduledocument:5:1">{}{}</Schedule_MarketDocument>"#,
        series(a_to_b),
        series(b_to_a)
    )
}

/// Write a file and backdate its modification time by `age_secs`
pub fn write_aged(dir: &Path, name: &str, content: &str, age_secs: u64) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Should write file");
    let file = std::fs::File::options()
        .write(true)
        .open(&path)
        .expect("Should open file");
    file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
        .expect("Should set mtime");
    path
}

/// A UTC instant given as London wall-clock time
pub fn london(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    London
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .expect("Unambiguous local time")
        .with_timezone(&Utc)
}
