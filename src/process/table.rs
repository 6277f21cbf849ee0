// src/process/table.rs

use tracing::{debug, warn};

/// Whitespace-split records with their reconciled column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    /// Every row is exactly `headers.len()` wide; missing trailing fields are `None`.
    pub rows: Vec<Vec<Option<String>>>,
    /// Records dropped for having more fields than `headers`.
    pub skipped: usize,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Split the payload into rows. Blank lines are ignored, over-wide records are
/// skipped, short ones are padded with nulls.
pub fn build<'a, I>(payload: I, headers: Vec<String>) -> RawTable
where
    I: IntoIterator<Item = &'a str>,
{
    let width = headers.len();
    let mut rows = Vec::new();
    let mut skipped = 0;

    for (idx, line) in payload.into_iter().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() > width {
            debug!(
                record = idx,
                expected = width,
                saw = fields.len(),
                "skipping over-wide record"
            );
            skipped += 1;
            continue;
        }
        let mut row: Vec<Option<String>> =
            fields.into_iter().map(|f| Some(f.to_string())).collect();
        row.resize(width, None);
        rows.push(row);
    }

    if skipped > 0 {
        warn!(skipped, kept = rows.len(), "skipped malformed records");
    }

    RawTable {
        headers,
        rows,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rows_are_schema_wide() {
        let payload = [
            "20230101T000000.0Z 1013.2 7",
            "",
            "20230101T000100.0Z 1013.4",
            "20230101T000200.0Z 1 2 3 4",
        ];
        let table = build(payload, headers(&["Timestamp", "Pressure", "Flag"]));
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.skipped, 1);
        assert!(table.rows.iter().all(|r| r.len() == 3));
        assert_eq!(table.rows[1][2], None);
        assert_eq!(table.rows[0][1].as_deref(), Some("1013.2"));
    }

    #[test]
    fn nothing_valid_is_still_a_table() {
        let table = build(["a b c"], headers(&["x"]));
        assert!(table.rows.is_empty());
        assert_eq!(table.skipped, 1);
        assert_eq!(table.column_index("x"), Some(0));
    }
}
