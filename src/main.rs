use anyhow::Context;
use clap::Parser;
use flowcheck_daemon::alert::AlertSink;
use flowcheck_daemon::config::{read_config, FlowcheckConfig};
use flowcheck_daemon::engine::{EngineSettings, ReconciliationEngine};
use flowcheck_daemon::scheduler::{Scheduler, SchedulerSettings};
use flowcheck_daemon::shutdown::{shutdown_channel, ShutdownSignal};
use flowcheck_daemon::snapshot::DirectoryFeed;
use flowcheck_daemon::utils::FLOWCHECK_VERSION;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "flowcheck.json";

/// Flowcheck Daemon - reconciles hourly nominations against day-schedule documents
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, env = "FLOWCHECK_CONFIG", default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Directory holding nomination snapshots (CSV)
    #[arg(long, env = "FLOWCHECK_SNAPSHOT_DIR")]
    snapshot_dir: Option<PathBuf>,

    /// Directory watched for day-schedule documents (XML)
    #[arg(long, env = "FLOWCHECK_TIMESERIES_DIR")]
    timeseries_dir: Option<PathBuf>,

    /// IANA timezone used to resolve hours
    #[arg(long, env = "FLOWCHECK_TIMEZONE")]
    timezone: Option<String>,

    /// Minute past the hour at which each cycle starts
    #[arg(long, env = "FLOWCHECK_SCHEDULE_MINUTE")]
    schedule_minute: Option<u32>,

    /// Seconds between polls while waiting for a new document
    #[arg(long, env = "FLOWCHECK_RETRY_SECS")]
    retry_secs: Option<u64>,

    /// Webhook URL for mismatch alerts
    #[arg(long, env = "FLOWCHECK_WEBHOOK_URL")]
    webhook_url: Option<String>,

    /// Disable the terminal bell
    #[arg(long)]
    no_bell: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "FLOWCHECK_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Also append logs to this file
    #[arg(long, env = "FLOWCHECK_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Run a single cycle now and exit
    #[arg(long)]
    once: bool,
}

impl Args {
    fn apply(&self, config: &mut FlowcheckConfig) {
        if let Some(dir) = &self.snapshot_dir {
            config.snapshot_dir = dir.clone();
        }
        if let Some(dir) = &self.timeseries_dir {
            config.timeseries_dir = dir.clone();
        }
        if let Some(tz) = &self.timezone {
            config.timezone = tz.clone();
        }
        if let Some(minute) = self.schedule_minute {
            config.schedule_minute = minute;
        }
        if let Some(secs) = self.retry_secs {
            config.retry_interval_secs = secs;
        }
        if let Some(url) = &self.webhook_url {
            config.alert.webhook_url = Some(url.clone());
        }
        if self.no_bell {
            config.alert.bell = false;
            config.idle_bell = false;
        }
    }
}

fn init_logging(args: &Args) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log level")?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match &args.log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        None => {
            builder.try_init().map_err(|e| anyhow::anyhow!(e))?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args)?;

    // Load configuration, then apply CLI overrides
    let mut config = match read_config(&args.config).await? {
        Some(config) => {
            info!(path = %args.config.display(), "Loaded configuration");
            config
        }
        None => {
            warn!(path = %args.config.display(), "No configuration file, using defaults");
            FlowcheckConfig::default()
        }
    };
    args.apply(&mut config);

    let settings = EngineSettings::from_config(&config)?;
    tokio::fs::create_dir_all(&settings.snapshot_dir).await?;
    tokio::fs::create_dir_all(&settings.timeseries_dir).await?;

    let sink = AlertSink::from_config(&config.alert)?;
    info!(
        version = FLOWCHECK_VERSION,
        snapshot_dir = %settings.snapshot_dir.display(),
        timeseries_dir = %settings.timeseries_dir.display(),
        timezone = %settings.tz,
        channels = ?sink.channel_names(),
        "Starting flowcheck daemon"
    );

    let engine = ReconciliationEngine::new(settings, sink);
    let mut scheduler = Scheduler::new(
        engine,
        Arc::new(DirectoryFeed),
        SchedulerSettings {
            minute: config.schedule_minute,
            settle_delay: config.settle_delay(),
        },
    );

    // Create shutdown signal channel
    let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Script interrupted by user, shutting down...");
            let _ = shutdown_tx.send(ShutdownSignal::Shutdown);
        }
    });

    if args.once {
        if let Some(report) = scheduler.tick(&mut shutdown_rx).await {
            info!(cycle_id = %report.cycle_id, outcome = %report.outcome.state(), "Cycle finished");
        }
        scheduler.finish().await;
    } else {
        scheduler.run(shutdown_rx).await;
    }

    info!("Flowcheck daemon stopped");
    Ok(())
}
