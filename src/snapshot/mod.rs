//! Tabular nomination snapshots.
//!
//! A snapshot is a header-less CSV with one row per hour of the business day.
//! Column 3 carries the nominated flow and column 4 its direction label.

mod reader;
mod source;
mod writer;

pub use reader::{parse_quantity, read_snapshot, row_at, SnapshotDocument, SnapshotRow};
pub use source::{DirectoryFeed, SnapshotSource};
pub use writer::{snapshot_file_name, write_snapshot};

use thiserror::Error;

/// Column holding the nominated quantity
pub const QUANTITY_COLUMN: usize = 3;

/// Column holding the direction label
pub const DIRECTION_COLUMN: usize = 4;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Row {row_index} out of range (snapshot has {row_count} rows)")]
    RowIndexOutOfRange { row_index: usize, row_count: usize },

    #[error("Row {row_index} column {column}: cannot parse '{value}'")]
    ColumnFormatError {
        row_index: usize,
        column: usize,
        value: String,
    },

    #[error("Snapshot capture failed: {0}")]
    CaptureFailed(String),
}
