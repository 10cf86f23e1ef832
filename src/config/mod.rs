use crate::timeseries::DirectionLabels;
use crate::utils::{SNAPSHOT_DIR, TIMESERIES_DIR};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from(SNAPSHOT_DIR)
}

fn default_timeseries_dir() -> PathBuf {
    PathBuf::from(TIMESERIES_DIR)
}

fn default_snapshot_extension() -> String {
    "csv".to_string()
}

fn default_timeseries_extension() -> String {
    "xml".to_string()
}

fn default_timezone() -> String {
    "Europe/London".to_string()
}

fn default_schedule_minute() -> u32 {
    45
}

fn default_retry_interval_secs() -> u64 {
    60
}

fn default_settle_delay_secs() -> u64 {
    2
}

fn default_beeps() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

/// Alert delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertConfig {
    /// Number of terminal bells per mismatch
    #[serde(default = "default_beeps")]
    pub beeps: u32,
    /// Ring the terminal bell on mismatch
    #[serde(default = "default_true")]
    pub bell: bool,
    /// POST each mismatch as JSON to this URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            beeps: default_beeps(),
            bell: true,
            webhook_url: None,
        }
    }
}

/// Flowcheck configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowcheckConfig {
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,
    #[serde(default = "default_timeseries_dir")]
    pub timeseries_dir: PathBuf,
    #[serde(default = "default_snapshot_extension")]
    pub snapshot_extension: String,
    #[serde(default = "default_timeseries_extension")]
    pub timeseries_extension: String,
    /// IANA timezone name used to resolve hours
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Minute past each hour at which a cycle starts (0-59)
    #[serde(default = "default_schedule_minute")]
    pub schedule_minute: u32,
    /// Seconds between polls while waiting for a new day-schedule document
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,
    /// Seconds to wait after writing a snapshot before reconciling
    #[serde(default = "default_settle_delay_secs")]
    pub settle_delay_secs: u64,
    /// Leading snapshot rows to skip before hour rows start
    #[serde(default)]
    pub snapshot_header_rows: usize,
    #[serde(default)]
    pub direction_labels: DirectionLabels,
    #[serde(default)]
    pub alert: AlertConfig,
    /// Ring the terminal bell on every empty poll
    #[serde(default)]
    pub idle_bell: bool,
}

impl Default for FlowcheckConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: default_snapshot_dir(),
            timeseries_dir: default_timeseries_dir(),
            snapshot_extension: default_snapshot_extension(),
            timeseries_extension: default_timeseries_extension(),
            timezone: default_timezone(),
            schedule_minute: default_schedule_minute(),
            retry_interval_secs: default_retry_interval_secs(),
            settle_delay_secs: default_settle_delay_secs(),
            snapshot_header_rows: 0,
            direction_labels: DirectionLabels::default(),
            alert: AlertConfig::default(),
            idle_bell: false,
        }
    }
}

impl FlowcheckConfig {
    /// Parsed target timezone
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::UnknownTimezone(self.timezone.clone()))
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tz()?;

        if self.schedule_minute > 59 {
            return Err(ConfigError::InvalidValue(
                "scheduleMinute",
                self.schedule_minute.to_string(),
            ));
        }
        if self.retry_interval_secs == 0 {
            return Err(ConfigError::InvalidValue("retryIntervalSecs", "0".to_string()));
        }
        if self.direction_labels.a_to_b == self.direction_labels.b_to_a {
            return Err(ConfigError::InvalidValue(
                "directionLabels",
                self.direction_labels.a_to_b.clone(),
            ));
        }

        Ok(())
    }
}

/// Read the configuration file
pub async fn read_config(config_path: &Path) -> Result<Option<FlowcheckConfig>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(config_path).await?;
    let config: FlowcheckConfig = serde_json::from_str(&content)?;
    Ok(Some(config))
}

/// Write the configuration file
pub async fn write_config(config_path: &Path, config: &FlowcheckConfig) -> Result<(), ConfigError> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(config)?;
    fs::write(config_path, content).await?;
    Ok(())
}
