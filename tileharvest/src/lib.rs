//! Harvest service around the tileharvest pipeline: configuration, request files and a
//! bounded job queue. The `tileharvest` binary is a thin command line front end for it.

pub mod config;
pub use config::Config;

pub mod jobs;
pub use jobs::*;

mod request;
pub use request::*;

use std::sync::Arc;
use tileharvest_core::ProgressRegistry;
use tileharvest_pipeline::{Harvester, HttpClient, SizeEstimator, SourceClient, SourceRegistry};

/// Source registry with every built-in strategy, talking HTTP as configured.
pub fn build_registry(config: &Config) -> anyhow::Result<Arc<SourceRegistry>> {
	let client: Arc<dyn SourceClient> = Arc::new(HttpClient::new(&config.http.to_options())?);
	Ok(Arc::new(SourceRegistry::with_defaults(client)))
}

pub fn build_queue(config: &Config, registry: Arc<SourceRegistry>) -> JobQueue {
	let harvester = Harvester::new(registry, ProgressRegistry::new(), config.harvest_options());
	JobQueue::new(harvester, config.workers)
}

pub fn build_estimator(config: &Config, registry: Arc<SourceRegistry>) -> SizeEstimator {
	SizeEstimator::new(registry, &config.matrix_set)
}
