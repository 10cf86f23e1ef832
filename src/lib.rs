pub mod alert;
pub mod clock;
pub mod config;
pub mod engine;
pub mod hour;
pub mod scheduler;
pub mod shutdown;
pub mod snapshot;
pub mod timeseries;
pub mod utils;
pub mod watcher;

// Re-export commonly used types
pub use alert::{
    AlertChannel, AlertError, AlertReport, AlertSink, AudibleChannel, LogChannel, MismatchEvent,
    SourceRefs, WebhookChannel,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{read_config, write_config, AlertConfig, ConfigError, FlowcheckConfig};
pub use engine::{
    compare, CycleError, CycleOutcome, CycleReport, CycleState, EngineSettings,
    ReconciliationEngine, Verdict,
};
pub use hour::{resolve, HourKey};
pub use scheduler::{next_fire, Scheduler, SchedulerSettings, TickKey};
pub use shutdown::{shutdown_channel, ShutdownListener, ShutdownSignal};
pub use snapshot::{
    read_snapshot, row_at, write_snapshot, DirectoryFeed, SnapshotDocument, SnapshotError,
    SnapshotRow, SnapshotSource,
};
pub use timeseries::{
    parse_document, quantity_at, read_document, Direction, DirectionLabels, Sample,
    TimeSeriesDocument, TimeSeriesError,
};
pub use watcher::FreshnessWatcher;
