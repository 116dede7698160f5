//! In-memory client that answers from a table of canned responses.

use super::SourceClient;
use anyhow::{Result, bail};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};
use tileharvest_core::Blob;

type Responder = Arc<dyn Fn(&str) -> Option<Blob> + Send + Sync>;

/// Answers exact URLs from a map first, then asks an optional responder. Everything else
/// fails like an HTTP 404. Every requested URL is recorded.
#[derive(Clone, Default)]
pub struct MockClient {
	responses: Arc<Mutex<HashMap<String, Blob>>>,
	responder: Option<Responder>,
	requests: Arc<Mutex<Vec<String>>>,
}

impl MockClient {
	pub fn new() -> MockClient {
		MockClient::default()
	}

	pub fn with_response(self, url: &str, body: impl Into<Blob>) -> MockClient {
		self.responses.lock().insert(url.to_owned(), body.into());
		self
	}

	pub fn with_responder(mut self, responder: impl Fn(&str) -> Option<Blob> + Send + Sync + 'static) -> MockClient {
		self.responder = Some(Arc::new(responder));
		self
	}

	pub fn requests(&self) -> Vec<String> {
		self.requests.lock().clone()
	}

	pub fn count_requests(&self, needle: &str) -> usize {
		self.requests.lock().iter().filter(|u| u.contains(needle)).count()
	}
}

impl std::fmt::Debug for MockClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MockClient")
			.field("responses", &self.responses.lock().len())
			.finish()
	}
}

#[async_trait]
impl SourceClient for MockClient {
	async fn get(&self, url: &str) -> Result<Blob> {
		self.requests.lock().push(url.to_owned());
		if let Some(blob) = self.responses.lock().get(url) {
			return Ok(blob.clone());
		}
		if let Some(responder) = &self.responder {
			if let Some(blob) = responder(url) {
				return Ok(blob);
			}
		}
		bail!("'{url}' answered with HTTP 404 Not Found")
	}
}
