use super::HttpConfig;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::{
	fs::File,
	io::{BufReader, Read},
	path::Path,
};
use tileharvest_pipeline::HarvestOptions;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
	/// Number of harvest jobs that may run at the same time.
	pub workers: usize,

	/// Tile requests in flight per job. 1 fetches tiles strictly one after the other.
	pub fetch_concurrency: usize,

	/// Tile matrix set requested from every service.
	pub matrix_set: String,

	pub http: HttpConfig,
}

impl Default for Config {
	fn default() -> Self {
		let harvest = HarvestOptions::default();
		Config {
			workers: 2,
			fetch_concurrency: harvest.fetch_concurrency,
			matrix_set: harvest.matrix_set,
			http: HttpConfig::default(),
		}
	}
}

impl Config {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		let config: Config = serde_yaml_ng::from_reader(reader)?;
		config.validate()?;
		Ok(config)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		if text.trim().is_empty() {
			return Ok(Config::default());
		}
		let config: Config = serde_yaml_ng::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path).with_context(|| format!("opening config file '{}'", path.display()))?;
		Config::from_reader(BufReader::new(file)).with_context(|| format!("parsing config file '{}'", path.display()))
	}

	/// Loads `path` if given, the defaults otherwise.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		match path {
			Some(path) => Config::from_path(path),
			None => Ok(Config::default()),
		}
	}

	pub fn validate(&self) -> Result<()> {
		ensure!(self.workers > 0, "workers must be at least 1");
		ensure!(self.fetch_concurrency > 0, "fetch_concurrency must be at least 1");
		ensure!(!self.matrix_set.trim().is_empty(), "matrix_set must not be empty");
		Ok(())
	}

	pub fn harvest_options(&self) -> HarvestOptions {
		HarvestOptions {
			matrix_set: self.matrix_set.clone(),
			fetch_concurrency: self.fetch_concurrency,
		}
	}
}
