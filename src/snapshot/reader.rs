use super::{SnapshotError, DIRECTION_COLUMN, QUANTITY_COLUMN};
use std::path::Path;
use tokio::fs;

/// Quantity and direction label for one hour
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRow {
    pub quantity: i64,
    pub direction: String,
}

/// All rows of a snapshot, addressed by position
#[derive(Debug, Clone, Default)]
pub struct SnapshotDocument {
    rows: Vec<Vec<String>>,
}

impl SnapshotDocument {
    /// Parse CSV text, dropping `header_rows` leading rows
    pub fn parse(content: &str, header_rows: usize) -> Result<Self, SnapshotError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records().skip(header_rows) {
            let record = record?;
            rows.push(record.iter().map(|f| f.to_string()).collect());
        }

        Ok(Self { rows })
    }

    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read and parse a snapshot file
pub async fn read_snapshot(path: &Path, header_rows: usize) -> Result<SnapshotDocument, SnapshotError> {
    let content = fs::read_to_string(path).await?;
    SnapshotDocument::parse(&content, header_rows)
}

/// Extract the quantity and direction label at `row_index`
pub fn row_at(row_index: usize, document: &SnapshotDocument) -> Result<SnapshotRow, SnapshotError> {
    let row = document
        .rows
        .get(row_index)
        .ok_or(SnapshotError::RowIndexOutOfRange {
            row_index,
            row_count: document.rows.len(),
        })?;

    let cell = |column: usize| {
        row.get(column).ok_or_else(|| SnapshotError::ColumnFormatError {
            row_index,
            column,
            value: String::new(),
        })
    };

    let raw_quantity = cell(QUANTITY_COLUMN)?;
    let quantity = parse_quantity(raw_quantity).ok_or_else(|| SnapshotError::ColumnFormatError {
        row_index,
        column: QUANTITY_COLUMN,
        value: raw_quantity.clone(),
    })?;

    let direction = cell(DIRECTION_COLUMN)?.trim().to_string();

    Ok(SnapshotRow {
        quantity,
        direction,
    })
}

/// Parse a displayed quantity such as `"1,234"` or `"1234.0"`.
///
/// Thousands separators are dropped and fractional values truncate toward zero.
pub fn parse_quantity(raw: &str) -> Option<i64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(value) = cleaned.parse::<i64>() {
        return Some(value);
    }

    let value = cleaned.parse::<f64>().ok()?;
    if !value.is_finite() || value.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(value.trunc() as i64)
}
