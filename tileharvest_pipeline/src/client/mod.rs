//! Transport used to talk to tile sources.

mod http;
pub use http::*;

#[cfg(any(test, feature = "test"))]
mod mock;
#[cfg(any(test, feature = "test"))]
pub use mock::*;

use anyhow::Result;
use async_trait::async_trait;
use tileharvest_core::Blob;

/// Fetches the body of a GET request. Non-success statuses are errors.
#[async_trait]
pub trait SourceClient: Send + Sync + std::fmt::Debug {
	async fn get(&self, url: &str) -> Result<Blob>;
}
