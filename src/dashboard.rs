// src/dashboard.rs

use reqwest::Client;
use serde::Serialize;
use std::{fmt, sync::Arc};
use tracing::{info, instrument, warn};
use url::Url;

use crate::config::Config;
use crate::error::{FetchError, QueryError, ResolveError};
use crate::fetch::{
    self,
    catalog::{self, FileEntry},
    files::fetch_text,
    listing::list_entries_or_empty,
    RetryPolicy,
};
use crate::process;
use crate::session::{query, Dataset, Series, Session, TimeRange};

/// What the UI shows next to the file picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Status {
    NoFileSelected,
    Loaded(String),
    NoData,
    NoTimestamp,
    LoadError(String),
    /// A newer selection started before this one finished loading.
    Superseded,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::NoFileSelected => write!(f, "No file selected."),
            Status::Loaded(url) => write!(f, "Loaded file: {}", url),
            Status::NoData => write!(f, "No valid data found in the file."),
            Status::NoTimestamp => write!(f, "No valid timestamp column found in the file."),
            Status::LoadError(e) => write!(f, "Error loading file: {}", e),
            Status::Superseded => write!(f, "Selection superseded by a newer one."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSelection {
    /// Plottable columns of the newly loaded file; empty unless it loaded.
    pub columns: Vec<String>,
    pub status: Status,
}

impl FileSelection {
    fn failed(status: Status) -> Self {
        Self {
            columns: Vec::new(),
            status,
        }
    }
}

/// A chart slot: its title and the series to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub series: Series,
}

impl Chart {
    fn new(slot: usize, series: Series) -> Self {
        let title = match &series {
            Series::Points { column, .. } => format!("Chart {}: {} Over Time", slot, column),
            _ => "No Data Available".to_string(),
        };
        Self { title, series }
    }
}

/// The surface the dashboard UI drives: navigation, file selection, and charts.
pub struct Dashboard {
    client: Client,
    config: Arc<Config>,
    base: Url,
    session: Arc<Session>,
}

impl Dashboard {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = fetch::client(&config)?;
        Self::with_client(client, config)
    }

    pub fn with_client(client: Client, config: Config) -> anyhow::Result<Self> {
        let base = config.base_url()?;
        Ok(Self {
            client,
            config: Arc::new(config),
            base,
            session: Arc::new(Session::new()),
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn retry(&self) -> RetryPolicy {
        RetryPolicy::from(self.config.as_ref())
    }

    pub async fn locations(&self) -> Vec<String> {
        list_entries_or_empty(&self.client, &self.base, &self.config.listing, self.retry()).await
    }

    pub async fn devices(&self, location: Option<&str>) -> Vec<String> {
        let Some(location) = location else {
            return Vec::new();
        };
        match catalog::location_url(&self.base, location) {
            Ok(url) => {
                list_entries_or_empty(&self.client, &url, &self.config.listing, self.retry()).await
            }
            Err(e) => {
                warn!(error = %e, "bad location");
                Vec::new()
            }
        }
    }

    pub async fn files(&self, location: Option<&str>, device: Option<&str>) -> Vec<FileEntry> {
        let (Some(location), Some(device)) = (location, device) else {
            return Vec::new();
        };
        catalog::device_files(&self.client, &self.config, &self.base, location, device)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "bad device");
                Vec::new()
            })
    }

    /// Fetch and resolve `file_url`, publishing it as the Session Dataset on
    /// success. Any failure leaves the previous dataset in place, and so does a
    /// load overtaken by a newer selection (reported as `Superseded`).
    #[instrument(level = "info", skip(self))]
    pub async fn select_file(&self, file_url: Option<&str>) -> FileSelection {
        let Some(file_url) = file_url else {
            return FileSelection::failed(Status::NoFileSelected);
        };
        let ticket = self.session.begin();

        let text = match self.download(file_url).await {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "download failed");
                return FileSelection::failed(Status::LoadError(e.to_string()));
            }
        };

        let table = match process::resolve(&text, &self.config.parse) {
            Ok(t) => t,
            Err(ResolveError::NoDataSection) => return FileSelection::failed(Status::NoData),
            Err(ResolveError::UnresolvedTimestamp) => {
                return FileSelection::failed(Status::NoTimestamp)
            }
            Err(e @ ResolveError::Arrow(_)) => {
                return FileSelection::failed(Status::LoadError(e.to_string()))
            }
        };

        let columns = table.value_columns();
        if !self.session.publish(ticket, Dataset::new(file_url, table)) {
            info!("selection superseded before it finished loading");
            return FileSelection::failed(Status::Superseded);
        }
        FileSelection {
            columns,
            status: Status::Loaded(file_url.to_string()),
        }
    }

    async fn download(&self, file_url: &str) -> Result<String, FetchError> {
        let url = Url::parse(file_url).map_err(|source| FetchError::InvalidUrl {
            url: file_url.to_string(),
            source,
        })?;
        fetch_text(&self.client, &url, self.retry()).await
    }

    /// One series for the current dataset.
    pub fn series(&self, column: Option<&str>, range: &TimeRange) -> Result<Series, QueryError> {
        let current = self.session.current();
        query(current.as_deref(), column, range)
    }

    /// The two independent chart slots.
    pub fn charts(
        &self,
        column1: Option<&str>,
        column2: Option<&str>,
        range: &TimeRange,
    ) -> [Result<Chart, QueryError>; 2] {
        let current = self.session.current();
        let chart = |slot, column| {
            query(current.as_deref(), column, range).map(|series| Chart::new(slot, series))
        };
        [chart(1, column1), chart(2, column2)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::test_server;
    use std::time::Duration;

    const FILE: &str = "\
Column 1: Timestamp, UTC
Column 2: Pressure, mbar
20230101T000000.000000Z 1013.2
20230101T000000.000000Z 1014.0
20230102T000000.000000Z 1012.5
";

    fn dashboard(base: &Url) -> Dashboard {
        let config = Config {
            base_url: base.to_string(),
            max_retries: 0,
            request_timeout_secs: 5,
            ..Config::default()
        };
        Dashboard::new(config).expect("dashboard")
    }

    #[test]
    fn status_strings() {
        assert_eq!(Status::NoData.to_string(), "No valid data found in the file.");
        assert_eq!(
            Status::NoTimestamp.to_string(),
            "No valid timestamp column found in the file."
        );
        assert_eq!(
            Status::Loaded("http://x/f.txt".into()).to_string(),
            "Loaded file: http://x/f.txt"
        );
        assert_eq!(
            Status::Superseded.to_string(),
            "Selection superseded by a newer one."
        );
    }

    #[tokio::test]
    async fn loads_then_keeps_dataset_on_failures() -> anyhow::Result<()> {
        let good = test_server::serve("200 OK", FILE.as_bytes().to_vec(), 1).await;
        let empty = test_server::serve("200 OK", b"Column 1: Timestamp\n".to_vec(), 1).await;
        let broken = test_server::serve("500 Internal Server Error", Vec::new(), 1).await;
        let untimed = test_server::serve(
            "200 OK",
            b"Column 1: Time of day\nColumn 2: Pressure\n20230101T000000.0Z 1\n".to_vec(),
            1,
        )
        .await;
        let dash = dashboard(&good);

        let sel = dash.select_file(Some(good.as_str())).await;
        assert_eq!(sel.status, Status::Loaded(good.to_string()));
        assert_eq!(sel.columns, vec!["Pressure"]);

        let sel = dash.select_file(Some(empty.as_str())).await;
        assert_eq!(sel.status, Status::NoData);
        assert!(sel.columns.is_empty());

        let sel = dash.select_file(Some(broken.as_str())).await;
        assert!(matches!(sel.status, Status::LoadError(_)));
        assert!(sel.columns.is_empty());

        let sel = dash.select_file(Some(untimed.as_str())).await;
        assert_eq!(sel.status, Status::NoTimestamp);
        assert!(sel.columns.is_empty());

        let current = dash.session().current().expect("still loaded");
        assert_eq!(current.source, good.as_str());
        assert_eq!(current.table.num_rows(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn charts_before_and_after_loading() -> anyhow::Result<()> {
        let good = test_server::serve("200 OK", FILE.as_bytes().to_vec(), 1).await;
        let dash = dashboard(&good);

        let [a, b] = dash.charts(Some("Pressure"), None, &TimeRange::default());
        assert_eq!(a?.series, Series::NoData);
        assert_eq!(b?.title, "No Data Available");

        dash.select_file(Some(good.as_str())).await;
        let [a, b] = dash.charts(Some("Pressure"), Some("Nope"), &TimeRange::default());
        let a = a?;
        assert_eq!(a.title, "Chart 1: Pressure Over Time");
        assert_eq!(a.series.points().len(), 2);
        assert_eq!(b, Err(QueryError::UnknownColumn("Nope".into())));
        Ok(())
    }

    #[tokio::test]
    async fn newer_selection_overtakes_a_slow_load() -> anyhow::Result<()> {
        let slow = test_server::serve_delayed(
            "200 OK",
            FILE.as_bytes().to_vec(),
            1,
            Duration::from_millis(300),
        )
        .await;
        let dash = dashboard(&slow);

        let (sel, _) = tokio::join!(dash.select_file(Some(slow.as_str())), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            dash.session().begin();
        });
        assert_eq!(sel.status, Status::Superseded);
        assert!(sel.columns.is_empty());
        assert!(dash.session().current().is_none());

        let [a, _] = dash.charts(Some("Pressure"), None, &TimeRange::default());
        assert_eq!(a?.series, Series::NoData);
        Ok(())
    }

    #[tokio::test]
    async fn no_selection_is_not_an_error() -> anyhow::Result<()> {
        let base = Url::parse("http://127.0.0.1:9/")?;
        let dash = dashboard(&base);
        assert_eq!(
            dash.select_file(None).await.status,
            Status::NoFileSelected
        );
        assert!(dash.devices(None).await.is_empty());
        assert!(dash.files(Some("Innsbruck"), None).await.is_empty());
        Ok(())
    }
}
