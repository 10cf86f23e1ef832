use super::types::MismatchEvent;
use super::AlertError;
use async_trait::async_trait;
use std::io::Write;
use std::time::Duration;

/// A delivery mechanism for mismatch alerts
#[async_trait]
pub trait AlertChannel: Send + Sync {
    /// Name used in logs and reports.
    fn name(&self) -> &str;

    /// Deliver one event.
    async fn send(&self, event: &MismatchEvent) -> Result<(), AlertError>;
}

/// Prints the alert to stdout; the sink has already logged it
#[derive(Debug, Default)]
pub struct LogChannel;

#[async_trait]
impl AlertChannel for LogChannel {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, event: &MismatchEvent) -> Result<(), AlertError> {
        println!("\n{}\n", event.message());
        Ok(())
    }
}

/// Rings the terminal bell a few times
#[derive(Debug, Clone)]
pub struct AudibleChannel {
    beeps: u32,
    pause: Duration,
}

impl AudibleChannel {
    pub fn new(beeps: u32, pause: Duration) -> Self {
        Self { beeps, pause }
    }
}

impl Default for AudibleChannel {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1300))
    }
}

#[async_trait]
impl AlertChannel for AudibleChannel {
    fn name(&self) -> &str {
        "audible"
    }

    async fn send(&self, _event: &MismatchEvent) -> Result<(), AlertError> {
        for i in 0..self.beeps {
            {
                let mut stderr = std::io::stderr().lock();
                stderr.write_all(b"\x07")?;
                stderr.flush()?;
            }
            if i + 1 < self.beeps && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
        }
        Ok(())
    }
}

/// POSTs the event as JSON to a webhook
#[derive(Debug, Clone)]
pub struct WebhookChannel {
    url: String,
    client: reqwest::Client,
}

impl WebhookChannel {
    pub fn new(url: impl Into<String>) -> Result<Self, AlertError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl AlertChannel for WebhookChannel {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, event: &MismatchEvent) -> Result<(), AlertError> {
        let payload = serde_json::json!({
            "type": "flow_mismatch",
            "subject": event.subject(),
            "message": event.message(),
            "event": event,
        });

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
