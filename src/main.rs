use anyhow::{Context, Result};
use chrono::NaiveDate;
use pgnscraper::{dashboard::Dashboard, Config, TimeRange};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "\
usage: pgnscraper [LOCATION [DEVICE [FILE [COLUMN1 [COLUMN2]]]]] [from=YYYY-MM-DD] [to=YYYY-MM-DD]

  no arguments           list locations
  LOCATION               list devices of a location
  LOCATION DEVICE        list L2 files of a device
  ... FILE [COLUMNS]     load a file, print its columns and the selected series as JSON";

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("bad date `{}`", raw))
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) arguments ────────────────────────────────────────────────
    let mut positional = Vec::new();
    let (mut from, mut to) = (None, None);
    for arg in env::args().skip(1) {
        if arg == "-h" || arg == "--help" {
            println!("{}", USAGE);
            return Ok(());
        } else if let Some(d) = arg.strip_prefix("from=") {
            from = Some(parse_date(d)?);
        } else if let Some(d) = arg.strip_prefix("to=") {
            to = Some(parse_date(d)?);
        } else {
            positional.push(arg);
        }
    }
    let arg = |i: usize| positional.get(i).map(String::as_str);

    // ─── 3) config + dashboard ───────────────────────────────────────
    let config = Config::load().context("loading config")?;
    info!(base = %config.base_url, "startup");
    let dash = Dashboard::new(config)?;

    // ─── 4) navigate ─────────────────────────────────────────────────
    match (arg(0), arg(1), arg(2)) {
        (None, _, _) => {
            for loc in dash.locations().await {
                println!("{}", loc);
            }
        }
        (Some(location), None, _) => {
            for device in dash.devices(Some(location)).await {
                println!("{}", device);
            }
        }
        (Some(location), Some(device), None) => {
            for file in dash.files(Some(location), Some(device)).await {
                println!("{}\t{}", file.label, file.url);
            }
        }
        (Some(location), Some(device), Some(file)) => {
            let files = dash.files(Some(location), Some(device)).await;
            let url = files
                .iter()
                .find(|f| f.label == file)
                .map(|f| f.url.clone())
                .unwrap_or_else(|| {
                    warn!(%file, "not in listing; trying it as a URL");
                    file.to_string()
                });

            let selection = dash.select_file(Some(&url)).await;
            eprintln!("{}", selection.status);

            let range = TimeRange::from_dates(from, to);
            let [chart1, chart2] = dash.charts(arg(3), arg(4), &range);
            let charts = [chart1?, chart2?];
            let out = serde_json::json!({
                "status": selection.status.to_string(),
                "columns": selection.columns,
                "charts": charts,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(())
}
