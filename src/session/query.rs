// src/session/query.rs

use arrow::{
    array::{Array, ArrayRef, Float64Array, StringArray, TimestampMicrosecondArray},
    datatypes::DataType,
    util::display::array_value_to_string,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::Dataset;
use crate::error::QueryError;
use crate::process::date_parser::micros_to_utc;

/// Inclusive time window; a missing bound is open on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Calendar dates from a date picker; each becomes midnight UTC of that day.
    pub fn from_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let midnight = |d: NaiveDate| d.and_hms_opt(0, 0, 0).map(|n| n.and_utc());
        Self {
            start: start.and_then(midnight),
            end: end.and_then(midnight),
        }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| t >= s) && self.end.map_or(true, |e| t <= e)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Null,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub timestamp: DateTime<Utc>,
    pub value: Scalar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Series {
    /// Nothing has been resolved yet.
    NoData,
    /// No column was chosen.
    NoColumn,
    Points { column: String, points: Vec<Point> },
}

impl Series {
    pub fn points(&self) -> &[Point] {
        match self {
            Series::Points { points, .. } => points,
            _ => &[],
        }
    }
}

fn scalar_at(col: &ArrayRef, i: usize) -> Scalar {
    if col.is_null(i) {
        return Scalar::Null;
    }
    match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map_or(Scalar::Null, |a| Scalar::Float(a.value(i))),
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map_or(Scalar::Null, |a| Scalar::Text(a.value(i).to_string())),
        DataType::Timestamp(..) => col
            .as_any()
            .downcast_ref::<TimestampMicrosecondArray>()
            .and_then(|a| micros_to_utc(a.value(i)))
            .map_or(Scalar::Null, Scalar::Timestamp),
        _ => array_value_to_string(col, i).map_or(Scalar::Null, Scalar::Text),
    }
}

/// One plot-ready series: `column` against the time axis, restricted to `range`.
/// Rows whose timestamp did not parse are never plotted.
pub fn query(
    dataset: Option<&Dataset>,
    column: Option<&str>,
    range: &TimeRange,
) -> Result<Series, QueryError> {
    let Some(dataset) = dataset else {
        return Ok(Series::NoData);
    };
    let Some(column) = column else {
        return Ok(Series::NoColumn);
    };
    let table = &dataset.table;
    let values = table
        .batch()
        .column_by_name(column)
        .ok_or_else(|| QueryError::UnknownColumn(column.to_string()))?;
    let ts = table.timestamps();

    let points = (0..ts.len())
        .filter(|&i| ts.is_valid(i))
        .filter_map(|i| micros_to_utc(ts.value(i)).map(|t| (i, t)))
        .filter(|(_, t)| range.contains(*t))
        .map(|(i, timestamp)| Point {
            timestamp,
            value: scalar_at(values, i),
        })
        .collect();

    Ok(Series::Points {
        column: column.to_string(),
        points,
    })
}
