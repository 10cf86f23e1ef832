//! Operator notification for reconciliation mismatches.

mod channels;
mod sink;
mod types;

pub use channels::{AlertChannel, AudibleChannel, LogChannel, WebhookChannel};
pub use sink::AlertSink;
pub use types::{AlertReport, ChannelFailure, MismatchEvent, SourceRefs};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlertError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Webhook error: {0}")]
    WebhookError(#[from] reqwest::Error),

    #[error("Channel {0} unavailable: {1}")]
    Unavailable(String, String),
}
