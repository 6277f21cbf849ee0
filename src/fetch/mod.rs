// src/fetch/mod.rs

use reqwest::{Client, Response};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::Config;

pub mod catalog;
pub mod files;
pub mod listing;

/// Build the shared HTTP client; every request it makes is bounded by the configured timeout.
pub fn client(config: &Config) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("pgnscraper/", env!("CARGO_PKG_VERSION")))
        .build()
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff_ms: 0,
        }
    }
}

impl From<&Config> for RetryPolicy {
    fn from(cfg: &Config) -> Self {
        Self {
            max_retries: cfg.max_retries,
            initial_backoff_ms: cfg.retry_backoff_ms,
        }
    }
}

async fn get_core(client: &Client, url: &Url) -> reqwest::Result<Response> {
    debug!("GET {}", url);
    client.get(url.clone()).send().await?.error_for_status()
}

/// GET `url`, treating transport errors and non-success statuses alike, with exponential backoff.
pub(crate) async fn get_with_retry(
    client: &Client,
    url: &Url,
    policy: RetryPolicy,
) -> reqwest::Result<Response> {
    let mut attempts = 0;
    loop {
        match get_core(client, url).await {
            Ok(resp) => return Ok(resp),
            Err(e) if attempts < policy.max_retries => {
                attempts += 1;
                let backoff = policy.initial_backoff_ms * 2u64.pow(attempts - 1);
                warn!(%url, attempt = attempts, delay_ms = backoff, error = %e, "Retrying");
                sleep(Duration::from_millis(backoff)).await;
            }
            Err(e) => {
                error!(%url, error = %e, "Exhausted retries");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use url::Url;

    /// Serve `count` connections with the same canned response; returns the base url.
    pub async fn serve(status: &'static str, body: Vec<u8>, count: usize) -> Url {
        serve_delayed(status, body, count, Duration::ZERO).await
    }

    /// Like `serve`, but each response is held back for `delay` after the request is read.
    pub async fn serve_delayed(
        status: &'static str,
        body: Vec<u8>,
        count: usize,
        delay: Duration,
    ) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            for _ in 0..count {
                let Ok((mut sock, _)) = listener.accept().await else {
                    return;
                };
                let mut buf = [0u8; 4096];
                let _ = sock.read(&mut buf).await;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let head = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status,
                    body.len()
                );
                let _ = sock.write_all(head.as_bytes()).await;
                let _ = sock.write_all(&body).await;
                let _ = sock.shutdown().await;
            }
        });
        Url::parse(&format!("http://{}/", addr)).expect("test url")
    }
}
