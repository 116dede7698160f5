use super::{ResolvedSource, TileSourceStrategy};
use crate::{SourceClient, wmts::WmtsStrategy};
use anyhow::Result;
use std::{collections::HashMap, sync::Arc};
use tileharvest_core::{HarvestError, MapService};

/// Strategies by service type. Lookups ignore case.
#[derive(Debug, Default)]
pub struct SourceRegistry {
	strategies: HashMap<String, Box<dyn TileSourceStrategy>>,
}

impl SourceRegistry {
	pub fn new_empty() -> SourceRegistry {
		SourceRegistry::default()
	}

	/// Registry with every built-in strategy, all sharing `client`.
	pub fn with_defaults(client: Arc<dyn SourceClient>) -> SourceRegistry {
		let mut registry = SourceRegistry::new_empty();
		registry.register(Box::new(WmtsStrategy::new(client)));
		registry
	}

	/// Adds a strategy, replacing one registered for the same type.
	pub fn register(&mut self, strategy: Box<dyn TileSourceStrategy>) {
		let key = strategy.service_type().to_ascii_uppercase();
		log::trace!("registering tile source strategy '{key}'");
		self.strategies.insert(key, strategy);
	}

	pub fn get(&self, service_type: &str) -> Result<&dyn TileSourceStrategy> {
		match self.strategies.get(&service_type.to_ascii_uppercase()) {
			Some(strategy) => Ok(strategy.as_ref()),
			None => Err(HarvestError::InvalidRequest(format!(
				"unsupported service type '{service_type}', known types: {}",
				self.service_types().join(", ")
			))
			.into()),
		}
	}

	/// Registered types, sorted.
	pub fn service_types(&self) -> Vec<String> {
		let mut types: Vec<String> = self.strategies.keys().cloned().collect();
		types.sort();
		types
	}

	/// Selects the strategy for `service` and resolves it.
	pub async fn open(&self, service: &MapService, matrix_set: &str) -> Result<Box<dyn ResolvedSource>> {
		self.get(&service.service_type)?.open(service, matrix_set).await
	}
}
