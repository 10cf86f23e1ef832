use crate::shutdown::ShutdownListener;
use crate::watcher::FreshnessWatcher;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Names of the new documents, sorted
    Ready(Vec<String>),
    Cancelled,
}

/// Poll `directory` every `interval` until a new document appears.
///
/// There is no timeout; only a shutdown ends the wait early. Shutdown is
/// checked before each poll and interrupts the sleep between polls.
pub async fn wait_for_document(
    watcher: &mut FreshnessWatcher,
    directory: &Path,
    interval: Duration,
    shutdown: &mut ShutdownListener,
    idle_bell: bool,
) -> WaitOutcome {
    let mut polls: u64 = 0;

    loop {
        if shutdown.is_shutdown() {
            return WaitOutcome::Cancelled;
        }

        let new = watcher.poll(directory);
        polls += 1;

        if !new.is_empty() {
            let mut names: Vec<String> = new.into_iter().collect();
            names.sort();
            info!(documents = ?names, "New day-schedule document(s) detected");
            return WaitOutcome::Ready(names);
        }

        info!(polls, "Still waiting, no new day-schedule document yet");
        if idle_bell {
            let mut stderr = std::io::stderr();
            let _ = stderr.write_all(b"\x07").and_then(|_| stderr.flush());
        }

        if shutdown.sleep(interval).await {
            return WaitOutcome::Cancelled;
        }
    }
}
