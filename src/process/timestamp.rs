// src/process/timestamp.rs

use arrow::{
    array::{ArrayRef, Float64Array, StringArray, TimestampMicrosecondArray},
    datatypes::{DataType, Field, Schema, TimeUnit},
    record_batch::RecordBatch,
};
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, warn};

use super::date_parser::parse_timestamp_micros;
use super::table::RawTable;
use super::utils::infer_column_dtype;
use super::ResolvedTable;
use crate::config::ParseRules;
use crate::error::ResolveError;

pub const TIMEZONE: &str = "UTC";

/// The first candidate label (in candidate order) present among `headers`.
pub fn find_timestamp_column<'a>(headers: &[String], candidates: &'a [String]) -> Option<&'a str> {
    candidates
        .iter()
        .find(|c| headers.iter().any(|h| h == *c))
        .map(String::as_str)
}

/// Row order after dropping repeated timestamps (first occurrence wins) and
/// sorting ascending. Unparsed (`None`) timestamps count as one value and sort last.
pub fn dedup_and_sort(keys: &[Option<i64>]) -> Vec<usize> {
    let mut seen = HashSet::with_capacity(keys.len());
    let mut order: Vec<usize> = (0..keys.len()).filter(|&i| seen.insert(keys[i])).collect();
    order.sort_by_key(|&i| (keys[i].is_none(), keys[i]));
    order
}

/// Designate the time axis, normalise it, and materialise the table in time order.
pub fn resolve_timestamp(raw: RawTable, rules: &ParseRules) -> Result<ResolvedTable, ResolveError> {
    let ts_name = find_timestamp_column(&raw.headers, &rules.timestamp_candidates)
        .ok_or(ResolveError::UnresolvedTimestamp)?
        .to_string();
    let ts_idx = raw
        .column_index(&ts_name)
        .ok_or(ResolveError::UnresolvedTimestamp)?;

    let keys: Vec<Option<i64>> = raw
        .rows
        .iter()
        .map(|row| {
            row[ts_idx]
                .as_deref()
                .and_then(|s| parse_timestamp_micros(s, &rules.timestamp_format))
        })
        .collect();
    let unparsed = keys.iter().filter(|k| k.is_none()).count();
    if unparsed > 0 {
        warn!(unparsed, column = %ts_name, "timestamps that did not parse");
    }

    let order = dedup_and_sort(&keys);
    debug!(
        rows = raw.rows.len(),
        distinct = order.len(),
        "dropped duplicate timestamps"
    );

    let mut fields = Vec::with_capacity(raw.headers.len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(raw.headers.len());
    for (j, name) in raw.headers.iter().enumerate() {
        if j == ts_idx {
            let arr: TimestampMicrosecondArray = order.iter().map(|&i| keys[i]).collect();
            let arr = arr.with_timezone(TIMEZONE);
            fields.push(Field::new(
                name,
                DataType::Timestamp(TimeUnit::Microsecond, Some(TIMEZONE.into())),
                true,
            ));
            columns.push(Arc::new(arr));
            continue;
        }

        let cells = || order.iter().map(|&i| raw.rows[i][j].as_deref());
        match infer_column_dtype(cells()) {
            DataType::Float64 => {
                let arr: Float64Array = cells()
                    .map(|c| c.and_then(|s| s.parse::<f64>().ok()))
                    .collect();
                fields.push(Field::new(name, DataType::Float64, true));
                columns.push(Arc::new(arr));
            }
            _ => {
                let arr: StringArray = cells().collect();
                fields.push(Field::new(name, DataType::Utf8, true));
                columns.push(Arc::new(arr));
            }
        }
    }

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
    Ok(ResolvedTable::new(batch, ts_name, raw.skipped))
}
