// src/process/header.rs

use std::collections::{HashMap, HashSet};
use tracing::trace;

use crate::config::ParseRules;

/// Hands out column names that are unique within one schema.
/// A repeated base name gets `_1`, `_2`, … in order of repetition.
#[derive(Debug, Default)]
pub struct UniqueNames {
    repeats: HashMap<String, usize>,
    taken: HashSet<String>,
    names: Vec<String>,
}

impl UniqueNames {
    pub fn from_names(names: Vec<String>) -> Self {
        let mut out = Self::default();
        for name in names {
            out.push(name);
        }
        out
    }

    pub fn push(&mut self, base: String) {
        let name = if self.taken.contains(&base) {
            let counter = self.repeats.entry(base.clone()).or_insert(0);
            loop {
                *counter += 1;
                let candidate = format!("{}_{}", base, counter);
                if !self.taken.contains(&candidate) {
                    break candidate;
                }
            }
        } else {
            base
        };
        self.taken.insert(name.clone());
        self.names.push(name);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

/// Header lines such as `Column 2: Pressure, mbar` declare one column each.
pub fn is_column_declaration(line: &str, rules: &ParseRules) -> bool {
    let t = line.trim();
    t.starts_with(rules.column_marker.as_str()) && !t.starts_with(rules.column_exclude.as_str())
}

/// The declared name: text after the first `:`, up to the first `,`.
pub fn declared_name(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once(':')?;
    let rest = rest.trim();
    Some(rest.split(',').next().unwrap_or(rest))
}

/// Column names in header order, disambiguated.
pub fn extract_column_names<'a, I>(lines: I, rules: &ParseRules) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut names = UniqueNames::default();
    for line in lines {
        if !is_column_declaration(line, rules) {
            continue;
        }
        if let Some(name) = declared_name(line) {
            trace!(%name, "column declaration");
            names.push(name.to_string());
        }
    }
    names.into_names()
}
