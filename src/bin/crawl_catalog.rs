// src/bin/crawl_catalog.rs

use anyhow::{Context, Result};
use pgnscraper::{fetch, Config};
use std::{env, fs::File, io::Write, time::Instant};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let out_path = env::args().nth(1).unwrap_or_else(|| "catalog.json".to_string());
    let config = Config::load().context("loading config")?;
    let client = fetch::client(&config)?;

    let start = Instant::now();
    let catalog = fetch::catalog::crawl(&client, &config).await?;
    info!(
        locations = catalog.locations.len(),
        files = catalog.file_count(),
        elapsed = ?start.elapsed(),
        "crawled"
    );

    let json = serde_json::to_string_pretty(&catalog)?;
    let mut file = File::create(&out_path).with_context(|| format!("creating {}", out_path))?;
    file.write_all(json.as_bytes())?;
    println!(
        "Wrote {} files across {} locations to {}",
        catalog.file_count(),
        catalog.locations.len(),
        out_path
    );
    Ok(())
}
