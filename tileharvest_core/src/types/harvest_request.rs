//! What to harvest: the source services, the area and the zoom range.
//!
//! Requests deserialize from YAML or JSON:
//!
//! ```yaml
//! services:
//!   - url: https://tiles.example.org/wmts
//!     layers: [ortho, labels]
//!     type: WMTS
//! extent: { x_min: 1.9, y_min: 41.2, x_max: 2.3, y_max: 41.5, srs: "EPSG:4326" }
//! min_zoom: 10
//! max_zoom: 14
//! ```

use super::{BoundingExtent, MAX_LEVEL};
use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

/// One remote tile source and the layers to take from it, bottom layer first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapService {
	pub url: String,
	pub layers: Vec<String>,
	/// Source type tag, e.g. `"WMTS"`; selects the source strategy.
	#[serde(rename = "type", alias = "service_type", default = "default_service_type")]
	pub service_type: String,
}

fn default_service_type() -> String {
	String::from("WMTS")
}

impl MapService {
	pub fn new(url: &str, layers: &[&str], service_type: &str) -> MapService {
		MapService {
			url: url.to_owned(),
			layers: layers.iter().map(|l| (*l).to_owned()).collect(),
			service_type: service_type.to_owned(),
		}
	}

	pub fn validate(&self) -> Result<()> {
		ensure!(
			self.url.starts_with("http://") || self.url.starts_with("https://"),
			"service URL '{}' must be an http(s) URL",
			self.url
		);
		ensure!(!self.layers.is_empty(), "service '{}' lists no layers", self.url);
		ensure!(
			self.layers.iter().all(|l| !l.trim().is_empty()),
			"service '{}' contains an empty layer name",
			self.url
		);
		ensure!(!self.service_type.trim().is_empty(), "service '{}' has no type", self.url);
		Ok(())
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarvestRequest {
	pub services: Vec<MapService>,
	pub extent: BoundingExtent,
	pub min_zoom: u8,
	pub max_zoom: u8,
}

impl HarvestRequest {
	/// Checks the request-level constraints; extent invariants hold by construction.
	pub fn validate(&self) -> Result<()> {
		ensure!(!self.services.is_empty(), "at least one map service is required");
		for service in &self.services {
			service.validate()?;
		}
		ensure!(
			self.min_zoom <= self.max_zoom,
			"min_zoom ({}) must be <= max_zoom ({})",
			self.min_zoom,
			self.max_zoom
		);
		ensure!(
			self.max_zoom <= MAX_LEVEL,
			"max_zoom ({}) must be <= {MAX_LEVEL}",
			self.max_zoom
		);
		Ok(())
	}

	/// Name of the resulting tile set: the first layer of the first service.
	pub fn first_layer(&self) -> Option<&str> {
		self.services.first().and_then(|s| s.layers.first()).map(String::as_str)
	}
}
