// src/config.rs

use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, time::Duration};
use tracing::{debug, info};
use url::Url;

use crate::error::ConfigError;
use crate::process::section::DataStart;

pub const DEFAULT_BASE_URL: &str = "https://data.ovh.pandonia-global-network.org/";

/// Optional YAML file with overrides for any field below.
pub const CONFIG_PATH_ENV: &str = "PGN_CONFIG";
pub const BASE_URL_ENV: &str = "PGN_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub listing: ListingRules,
    pub parse: ParseRules,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            max_retries: 2,
            retry_backoff_ms: 500,
            listing: ListingRules::default(),
            parse: ParseRules::default(),
        }
    }
}

/// Which anchors of a directory listing count as entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ListingRules {
    /// Only hrefs starting with this are entries of the current directory.
    pub entry_prefix: String,
    /// Entries (with `entry_prefix` removed) starting with any of these are dropped.
    pub excluded_prefixes: Vec<String>,
}

impl Default for ListingRules {
    fn default() -> Self {
        Self {
            entry_prefix: "./".into(),
            excluded_prefixes: vec![
                "../".into(),
                "javascript".into(),
                "operationfiles".into(),
            ],
        }
    }
}

/// Literal markers the measurement files are recognised by.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParseRules {
    pub column_marker: String,
    /// Provenance lines can look like declarations; never treat these as columns.
    pub column_exclude: String,
    pub data_start: DataStart,
    /// Checked in order; the first one present in the schema is the time axis.
    pub timestamp_candidates: Vec<String>,
    pub timestamp_format: String,
}

impl Default for ParseRules {
    fn default() -> Self {
        Self {
            column_marker: "Column".into(),
            column_exclude: "From".into(),
            data_start: DataStart::default(),
            timestamp_candidates: vec![
                "Timestamp".into(),
                "UT date and time for measurement center".into(),
            ],
            timestamp_format: "%Y%m%dT%H%M%S%.fZ".into(),
        }
    }
}

impl Config {
    /// Defaults, then `$PGN_CONFIG` (YAML) if set, then `$PGN_BASE_URL`.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = match env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_yaml_file(&path)?,
            Err(_) => Self::default(),
        };
        if let Ok(base) = env::var(BASE_URL_ENV) {
            debug!(%base, "base url from environment");
            cfg.base_url = base;
        }
        cfg.base_url()?;
        Ok(cfg)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let cfg = Self::from_yaml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// The base listing location, always with a trailing `/` so joins stay inside it.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let mut raw = self.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|source| ConfigError::InvalidBaseUrl { url: raw, source })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn defaults_match_the_known_corpus() {
        let cfg = Config::default();
        assert_eq!(cfg.parse.column_marker, "Column");
        assert_eq!(cfg.parse.column_exclude, "From");
        assert_eq!(
            cfg.parse.data_start,
            DataStart::DecadePrefix {
                prefix: "202".into()
            }
        );
        assert_eq!(cfg.parse.timestamp_candidates[0], "Timestamp");
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() -> Result<()> {
        let cfg = Config::from_yaml_str(
            r#"
base_url: "http://localhost:8080/data"
max_retries: 0
parse:
  data_start:
    kind: timestamp_token
"#,
        )?;
        assert_eq!(cfg.max_retries, 0);
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.parse.data_start, DataStart::TimestampToken);
        assert_eq!(cfg.parse.column_marker, "Column");
        assert_eq!(cfg.base_url()?.as_str(), "http://localhost:8080/data/");
        Ok(())
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let cfg = Config {
            base_url: "not a url".into(),
            ..Config::default()
        };
        assert!(matches!(
            cfg.base_url(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }
}
