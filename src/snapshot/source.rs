use super::SnapshotError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Producer of snapshot rows, usually a browser session on the nomination portal.
///
/// Implementations own any external resources they hold; `shutdown` is called
/// exactly once when the scheduler stops, whatever the exit path.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Capture the rows for `business_day`.
    ///
    /// `Ok(None)` means this source does not produce snapshots itself.
    async fn capture(&self, business_day: NaiveDate) -> Result<Option<Vec<Vec<String>>>, SnapshotError>;

    /// Release external resources.
    async fn shutdown(&self) {}
}

/// Source used when another process drops snapshots into the snapshot directory
#[derive(Debug, Default)]
pub struct DirectoryFeed;

#[async_trait]
impl SnapshotSource for DirectoryFeed {
    fn name(&self) -> &str {
        "directory"
    }

    async fn capture(&self, _business_day: NaiveDate) -> Result<Option<Vec<Vec<String>>>, SnapshotError> {
        Ok(None)
    }
}
