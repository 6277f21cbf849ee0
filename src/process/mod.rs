// src/process/mod.rs
use arrow::{
    array::{Array, TimestampMicrosecondArray},
    record_batch::RecordBatch,
};
use tracing::{debug, info, instrument};

use crate::config::ParseRules;
use crate::error::ResolveError;

pub mod date_parser;
pub mod header;
pub mod reconcile;
pub mod section;
pub mod table;
pub mod timestamp;
pub mod utils;

/// A measurement file reduced to a time-ordered table with exactly one time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTable {
    batch: RecordBatch,
    timestamp_column: String,
    skipped: usize,
}

impl ResolvedTable {
    pub(crate) fn new(batch: RecordBatch, timestamp_column: String, skipped: usize) -> Self {
        Self {
            batch,
            timestamp_column,
            skipped,
        }
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn timestamp_column(&self) -> &str {
        &self.timestamp_column
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Records the builder dropped as malformed.
    pub fn skipped_records(&self) -> usize {
        self.skipped
    }

    /// Every column name, in file order.
    pub fn columns(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Columns that can be plotted against time.
    pub fn value_columns(&self) -> Vec<String> {
        self.columns()
            .into_iter()
            .filter(|c| c != &self.timestamp_column)
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.batch.schema().index_of(name).is_ok()
    }

    pub fn timestamps(&self) -> &TimestampMicrosecondArray {
        self.batch
            .column_by_name(&self.timestamp_column)
            .and_then(|c| c.as_any().downcast_ref::<TimestampMicrosecondArray>())
            .expect("timestamp column is always a microsecond timestamp array")
    }
}

/// Run the whole pipeline over the text of one file.
#[instrument(level = "info", skip(text, rules), fields(bytes = text.len()))]
pub fn resolve(text: &str, rules: &ParseRules) -> Result<ResolvedTable, ResolveError> {
    let lines: Vec<&str> = text.lines().collect();

    let declared = header::extract_column_names(lines.iter().copied(), rules);
    debug!(declared = declared.len(), "header columns");

    let section = section::locate_data_section(&lines, &rules.data_start)
        .ok_or(ResolveError::NoDataSection)?;
    debug!(start_line = section.start_line(), "data section");

    let names = reconcile::reconcile(declared, section.first_line());
    let raw = table::build(section.lines().iter().copied(), names);
    let resolved = timestamp::resolve_timestamp(raw, rules)?;

    info!(
        rows = resolved.num_rows(),
        columns = resolved.batch().num_columns(),
        timestamp = %resolved.timestamp_column(),
        "resolved"
    );
    Ok(resolved)
}
