use crate::utils::list_file_names;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Reports documents that appeared in a directory since the last poll.
///
/// Every name seen is remembered for the lifetime of the watcher, so a file is
/// reported at most once even if it is deleted and recreated later.
#[derive(Debug, Clone)]
pub struct FreshnessWatcher {
    extension: String,
    seen: HashSet<String>,
}

impl FreshnessWatcher {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            seen: HashSet::new(),
        }
    }

    /// Return names in `directory` not reported before, and remember them all.
    pub fn poll(&mut self, directory: &Path) -> HashSet<String> {
        let current = list_file_names(directory, &self.extension);

        let new: HashSet<String> = current.difference(&self.seen).cloned().collect();
        self.seen.extend(current);

        if !new.is_empty() {
            debug!(
                directory = %directory.display(),
                count = new.len(),
                "New documents detected"
            );
        }

        new
    }

    /// Forget every name seen so far
    pub fn reset(&mut self) {
        self.seen.clear();
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_poll_twice_without_change() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ds_1.xml"), "<a/>").unwrap();

        let mut watcher = FreshnessWatcher::new("xml");
        let first = watcher.poll(dir.path());
        assert_eq!(first.len(), 1);
        assert!(first.contains("ds_1.xml"));

        assert!(watcher.poll(dir.path()).is_empty());
    }

    #[test]
    fn test_poll_reports_only_new_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ds_1.xml"), "").unwrap();

        let mut watcher = FreshnessWatcher::new("xml");
        watcher.poll(dir.path());

        fs::write(dir.path().join("ds_2.xml"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let new = watcher.poll(dir.path());
        assert_eq!(new, HashSet::from(["ds_2.xml".to_string()]));
    }

    #[test]
    fn test_deleted_and_recreated_file_is_not_reported_again() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ds_1.xml");
        fs::write(&path, "").unwrap();

        let mut watcher = FreshnessWatcher::new("xml");
        watcher.poll(dir.path());

        fs::remove_file(&path).unwrap();
        assert!(watcher.poll(dir.path()).is_empty());

        fs::write(&path, "").unwrap();
        assert!(watcher.poll(dir.path()).is_empty());
        assert_eq!(watcher.seen_count(), 1);
    }

    #[test]
    fn test_reset_forgets_seen_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ds_1.xml"), "").unwrap();

        let mut watcher = FreshnessWatcher::new("xml");
        watcher.poll(dir.path());
        watcher.reset();

        assert_eq!(watcher.seen_count(), 0);
        assert_eq!(watcher.poll(dir.path()).len(), 1);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let mut watcher = FreshnessWatcher::new("xml");
        assert!(watcher.poll(&dir.path().join("missing")).is_empty());
    }
}
