use super::channels::{AlertChannel, AudibleChannel, LogChannel, WebhookChannel};
use super::types::{AlertReport, ChannelFailure, MismatchEvent};
use super::AlertError;
use crate::config::AlertConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

/// Fans a mismatch out to every configured channel.
///
/// The event is always written to the log first. Channel failures are
/// collected in the report and never returned as errors.
#[derive(Clone, Default)]
pub struct AlertSink {
    channels: Vec<Arc<dyn AlertChannel>>,
}

impl AlertSink {
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    /// Build the channel set described by the alert configuration
    pub fn from_config(config: &AlertConfig) -> Result<Self, AlertError> {
        let mut sink = Self::new();
        sink.add_channel(Arc::new(LogChannel));

        if config.bell && config.beeps > 0 {
            sink.add_channel(Arc::new(AudibleChannel::new(
                config.beeps,
                Duration::from_millis(1300),
            )));
        }

        if let Some(url) = &config.webhook_url {
            sink.add_channel(Arc::new(WebhookChannel::new(url.clone())?));
        }

        Ok(sink)
    }

    pub fn add_channel(&mut self, channel: Arc<dyn AlertChannel>) {
        self.channels.push(channel);
    }

    pub fn channel_names(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.name().to_string()).collect()
    }

    pub async fn notify(&self, event: &MismatchEvent) -> AlertReport {
        warn!(
            hour = %event.hour_label,
            direction = %event.direction,
            expected = event.expected_value,
            observed = event.observed_value,
            snapshot = %event.source_refs.snapshot_path.display(),
            timeseries = %event.source_refs.timeseries_path.display(),
            "Flow mismatch"
        );

        let mut report = AlertReport::default();

        for channel in &self.channels {
            match channel.send(event).await {
                Ok(()) => report.delivered.push(channel.name().to_string()),
                Err(e) => {
                    error!(channel = channel.name(), "Alert delivery failed: {}", e);
                    report.failed.push(ChannelFailure {
                        channel: channel.name().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }
}

impl std::fmt::Debug for AlertSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertSink")
            .field("channels", &self.channel_names())
            .finish()
    }
}
