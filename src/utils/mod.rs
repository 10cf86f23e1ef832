mod files;

pub use files::{has_extension, latest_file, list_file_names};

/// Default directory for scraped nomination snapshots
pub const SNAPSHOT_DIR: &str = "rnp_files";

/// Default directory watched for day-schedule documents
pub const TIMESERIES_DIR: &str = "ds_files";

/// Current flowcheck version
pub const FLOWCHECK_VERSION: &str = env!("CARGO_PKG_VERSION");
