//! HTTP(S) transport based on `reqwest`.
//!
//! Connection failures and timeouts are retried with exponential backoff (1s, 2s, 4s, ...).
//! HTTP error statuses are not retried: a source answering 404 for a tile will answer 404
//! again.

use super::SourceClient;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tileharvest_core::Blob;
use tokio::time::sleep;

#[derive(Clone, Debug, PartialEq)]
pub struct HttpOptions {
	pub timeout: Duration,
	/// Additional attempts after the first failed one.
	pub retries: u32,
	pub user_agent: String,
}

impl Default for HttpOptions {
	fn default() -> Self {
		HttpOptions {
			timeout: Duration::from_secs(30),
			retries: 1,
			user_agent: format!("tileharvest/{}", env!("CARGO_PKG_VERSION")),
		}
	}
}

#[derive(Debug)]
pub struct HttpClient {
	client: Client,
	retries: u32,
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
	err.is_connect() || err.is_timeout() || err.is_body()
}

impl HttpClient {
	pub fn new(options: &HttpOptions) -> Result<HttpClient> {
		let client = Client::builder()
			.timeout(options.timeout)
			.tcp_keepalive(Duration::from_secs(600))
			.user_agent(options.user_agent.clone())
			.use_rustls_tls()
			.build()
			.context("building HTTP client")?;
		Ok(HttpClient {
			client,
			retries: options.retries,
		})
	}
}

#[async_trait]
impl SourceClient for HttpClient {
	async fn get(&self, url: &str) -> Result<Blob> {
		let max_retries = self.retries;
		for attempt in 0..=max_retries {
			if attempt > 0 {
				let backoff = Duration::from_secs(1 << (attempt - 1).min(6));
				log::warn!("retry attempt {attempt}/{max_retries} for '{url}', waiting {backoff:?}");
				sleep(backoff).await;
			}

			let response = match self.client.get(url).send().await {
				Ok(r) => r,
				Err(e) if is_retryable_error(&e) && attempt < max_retries => {
					log::warn!("retryable error: {e}");
					continue;
				}
				Err(e) => return Err(e).with_context(|| format!("requesting '{url}'")),
			};

			let status = response.status();
			if !status.is_success() {
				bail!("'{url}' answered with HTTP {status}");
			}

			let bytes = match response.bytes().await {
				Ok(b) => b,
				Err(e) if is_retryable_error(&e) && attempt < max_retries => {
					log::warn!("retryable error reading response body: {e}");
					continue;
				}
				Err(e) => return Err(e).with_context(|| format!("reading body of '{url}'")),
			};

			log::trace!("GET '{url}': {} bytes", bytes.len());
			return Ok(Blob::from(bytes.to_vec()));
		}

		bail!("request to '{url}' failed after {max_retries} retries")
	}
}
