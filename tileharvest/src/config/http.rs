use serde::Deserialize;
use std::time::Duration;
use tileharvest_pipeline::HttpOptions;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct HttpConfig {
	/// Timeout of a single request, in seconds.
	pub timeout_seconds: u64,

	/// Additional attempts after a connection failure or timeout.
	pub retries: u32,

	pub user_agent: String,
}

impl Default for HttpConfig {
	fn default() -> Self {
		let options = HttpOptions::default();
		HttpConfig {
			timeout_seconds: options.timeout.as_secs(),
			retries: options.retries,
			user_agent: options.user_agent,
		}
	}
}

impl HttpConfig {
	pub fn to_options(&self) -> HttpOptions {
		HttpOptions {
			timeout: Duration::from_secs(self.timeout_seconds),
			retries: self.retries,
			user_agent: self.user_agent.clone(),
		}
	}
}
