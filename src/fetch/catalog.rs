// src/fetch/catalog.rs

use futures::{stream::FuturesUnordered, StreamExt};
use reqwest::Client;
use serde::Serialize;
use tracing::{info, instrument};
use url::Url;

use super::listing::list_entries_or_empty;
use super::RetryPolicy;
use crate::config::Config;
use crate::error::FetchError;

/// Level-2 products live in this subfolder of every device.
pub const PRODUCT_DIR: &str = "L2";

const MAX_CONCURRENCY: usize = 4;

pub fn location_url(base: &Url, location: &str) -> Result<Url, FetchError> {
    join(base, &format!("{}/", location))
}

pub fn product_url(base: &Url, location: &str, device: &str) -> Result<Url, FetchError> {
    join(base, &format!("{}/{}/{}/", location, device, PRODUCT_DIR))
}

pub fn file_url(product: &Url, file: &str) -> Result<Url, FetchError> {
    join(product, file)
}

fn join(base: &Url, rel: &str) -> Result<Url, FetchError> {
    base.join(rel).map_err(|source| FetchError::InvalidUrl {
        url: format!("{}{}", base, rel),
        source,
    })
}

/// A selectable file: what to show, and where to fetch it from.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileEntry {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct Catalog {
    pub base_url: String,
    pub locations: Vec<LocationNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationNode {
    pub name: String,
    pub devices: Vec<DeviceNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceNode {
    pub name: String,
    pub files: Vec<FileEntry>,
}

impl Catalog {
    pub fn file_count(&self) -> usize {
        self.locations
            .iter()
            .flat_map(|l| &l.devices)
            .map(|d| d.files.len())
            .sum()
    }
}

/// List the L2 files of one device; an unreachable listing yields no files.
pub async fn device_files(
    client: &Client,
    config: &Config,
    base: &Url,
    location: &str,
    device: &str,
) -> Result<Vec<FileEntry>, FetchError> {
    let l2 = product_url(base, location, device)?;
    let names =
        list_entries_or_empty(client, &l2, &config.listing, RetryPolicy::from(config)).await;
    names
        .into_iter()
        .map(|name| {
            let url = file_url(&l2, &name)?;
            Ok::<_, FetchError>(FileEntry {
                label: name,
                url: url.to_string(),
            })
        })
        .collect()
}

async fn crawl_location(
    client: &Client,
    config: &Config,
    base: &Url,
    location: String,
) -> Result<LocationNode, FetchError> {
    let url = location_url(base, &location)?;
    let devices =
        list_entries_or_empty(client, &url, &config.listing, RetryPolicy::from(config)).await;
    let mut nodes = Vec::with_capacity(devices.len());
    for device in devices {
        let files = device_files(client, config, base, &location, &device).await?;
        nodes.push(DeviceNode {
            name: device,
            files,
        });
    }
    Ok(LocationNode {
        name: location,
        devices: nodes,
    })
}

/// Walk locations → devices → L2 files under the configured base listing.
#[instrument(level = "info", skip(client, config))]
pub async fn crawl(client: &Client, config: &Config) -> anyhow::Result<Catalog> {
    let base = config.base_url()?;
    let locations =
        list_entries_or_empty(client, &base, &config.listing, RetryPolicy::from(config)).await;
    info!(count = locations.len(), "locations");

    let mut tasks = FuturesUnordered::new();
    let mut nodes = Vec::with_capacity(locations.len());
    for location in locations {
        tasks.push(crawl_location(client, config, &base, location));

        // throttle concurrency
        if tasks.len() >= MAX_CONCURRENCY {
            if let Some(res) = tasks.next().await {
                nodes.push(res?);
            }
        }
    }
    while let Some(res) = tasks.next().await {
        nodes.push(res?);
    }
    nodes.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Catalog {
        base_url: base.to_string(),
        locations: nodes,
    })
}
