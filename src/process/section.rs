// src/process/section.rs

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `YYYYMMDDThhmmss[.f]Z`, the shape of the measurement timestamps.
static TIMESTAMP_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{8}T\d{6}(\.\d+)?Z$").expect("timestamp token regex should be valid")
});

/// How the first record of the data section is recognised.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataStart {
    /// Trimmed line starts with a literal prefix. The default `"202"` assumes
    /// every record of the corpus is stamped in the 2020s.
    DecadePrefix { prefix: String },
    /// First whitespace token looks like a full measurement timestamp, any year.
    TimestampToken,
}

impl Default for DataStart {
    fn default() -> Self {
        DataStart::DecadePrefix {
            prefix: "202".into(),
        }
    }
}

impl DataStart {
    pub fn matches(&self, line: &str) -> bool {
        match self {
            DataStart::DecadePrefix { prefix } => line.trim().starts_with(prefix.as_str()),
            DataStart::TimestampToken => line
                .split_whitespace()
                .next()
                .is_some_and(|tok| TIMESTAMP_TOKEN.is_match(tok)),
        }
    }
}

/// The payload: every line from the first matching one to end of input.
/// Only `locate_data_section` builds one, so it always holds that first line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataSection<'a> {
    start_line: usize,
    first: &'a str,
    lines: &'a [&'a str],
}

impl<'a> DataSection<'a> {
    /// Zero-based index of the first data line in the whole file.
    pub fn start_line(&self) -> usize {
        self.start_line
    }

    pub fn first_line(&self) -> &'a str {
        self.first
    }

    pub fn lines(&self) -> &'a [&'a str] {
        self.lines
    }
}

pub fn locate_data_section<'a>(lines: &'a [&'a str], rule: &DataStart) -> Option<DataSection<'a>> {
    let start = lines.iter().position(|l| rule.matches(l))?;
    let rest = &lines[start..];
    let (&first, _) = rest.split_first()?;
    Some(DataSection {
        start_line: start,
        first,
        lines: rest,
    })
}
