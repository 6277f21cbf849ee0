// src/fetch/files.rs

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::{get_with_retry, RetryPolicy};
use crate::error::FetchError;

/// Download a measurement file and decode it as UTF-8, dropping invalid byte sequences.
#[instrument(level = "info", skip(client, url, policy), fields(url = %url))]
pub async fn fetch_text(
    client: &Client,
    url: &Url,
    policy: RetryPolicy,
) -> Result<String, FetchError> {
    let failed = |source| FetchError::FetchFailed {
        url: url.to_string(),
        source,
    };
    let bytes = get_with_retry(client, url, policy)
        .await
        .map_err(failed)?
        .bytes()
        .await
        .map_err(failed)?;
    debug!(bytes = bytes.len(), "downloaded");
    Ok(decode_lossy(&bytes))
}

/// Like `String::from_utf8_lossy`, but invalid sequences are removed instead of replaced.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}
