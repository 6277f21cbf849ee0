// src/bin/inspect_file.rs

use anyhow::{Context, Result};
use arrow::array::Array;
use pgnscraper::{
    fetch::{self, files::decode_lossy, RetryPolicy},
    process, Config,
};
use std::{env, fs};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

/// Resolve a local file or a URL and print what the pipeline made of it.
#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let target = env::args()
        .nth(1)
        .context("Usage: inspect_file <PATH_OR_URL>")?;
    let config = Config::load().context("loading config")?;

    let text = match Url::parse(&target) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            let client = fetch::client(&config)?;
            fetch::files::fetch_text(&client, &url, RetryPolicy::from(&config)).await?
        }
        _ => {
            let bytes = fs::read(&target).with_context(|| format!("reading {}", target))?;
            decode_lossy(&bytes)
        }
    };

    let table = process::resolve(&text, &config.parse)?;
    let ts = table.timestamps();
    let first = (0..ts.len()).find(|&i| ts.is_valid(i)).map(|i| ts.value(i));
    let last = (0..ts.len()).rev().find(|&i| ts.is_valid(i)).map(|i| ts.value(i));

    println!("source:           {}", target);
    println!("timestamp column: {}", table.timestamp_column());
    println!("rows:             {}", table.num_rows());
    println!("skipped records:  {}", table.skipped_records());
    if let (Some(first), Some(last)) = (
        first.and_then(process::date_parser::micros_to_utc),
        last.and_then(process::date_parser::micros_to_utc),
    ) {
        println!("span:             {} .. {}", first, last);
    }
    println!("columns:");
    for field in table.batch().schema().fields() {
        let col = table
            .batch()
            .column_by_name(field.name())
            .context("column vanished")?;
        println!(
            "  {:<60} {:<28} nulls={}",
            field.name(),
            format!("{}", field.data_type()),
            col.null_count()
        );
    }
    Ok(())
}
