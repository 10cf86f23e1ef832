use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    None,
    Shutdown,
}

/// Create a shutdown sender and the listener handed to long-running loops
pub fn shutdown_channel() -> (watch::Sender<ShutdownSignal>, ShutdownListener) {
    let (tx, rx) = watch::channel(ShutdownSignal::None);
    (tx, ShutdownListener { rx })
}

/// Receiving side of the shutdown channel.
///
/// If every sender is dropped without signalling, the listener never reports
/// a shutdown.
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<ShutdownSignal>,
}

impl ShutdownListener {
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow() == ShutdownSignal::Shutdown
    }

    /// Sleep for `duration` unless a shutdown arrives first.
    ///
    /// Returns `true` when the sleep was cut short by a shutdown.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        if self.is_shutdown() {
            return true;
        }

        let interrupted = tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = Self::signalled(&mut self.rx) => true,
        };

        interrupted || self.is_shutdown()
    }

    async fn signalled(rx: &mut watch::Receiver<ShutdownSignal>) {
        loop {
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
            if *rx.borrow() == ShutdownSignal::Shutdown {
                return;
            }
        }
    }
}
