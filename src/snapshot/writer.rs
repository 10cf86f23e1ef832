use super::SnapshotError;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;

/// File name for a snapshot taken at `taken_at`
pub fn snapshot_file_name(taken_at: DateTime<Utc>) -> String {
    format!("rnp_at_{}.csv", taken_at.format("%Y%m%d_%H%M%S"))
}

/// Persist scraped rows as a header-less CSV snapshot.
///
/// The file is written under a temporary name and renamed into place, so the
/// reconciliation side never observes a half-written snapshot.
pub async fn write_snapshot(
    directory: &Path,
    rows: &[Vec<String>],
    taken_at: DateTime<Utc>,
) -> Result<PathBuf, SnapshotError> {
    fs::create_dir_all(directory).await?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    let content = writer
        .into_inner()
        .map_err(|e| SnapshotError::IoError(e.into_error()))?;

    let path = directory.join(snapshot_file_name(taken_at));
    let temp_path = path.with_extension("csv.tmp");
    fs::write(&temp_path, &content).await?;
    fs::rename(&temp_path, &path).await?;

    Ok(path)
}
