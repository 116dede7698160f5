//! The metadata block written into a finished tile store.

use tileharvest_core::BoundingExtent;

/// Describes a finished tile set. Written once, at finalization.
#[derive(Clone, Debug, PartialEq)]
pub struct TileSetMetadata {
	pub name: String,
	pub description: String,
	pub version: String,
	/// Bounds in EPSG:4326.
	pub bounds: BoundingExtent,
	pub min_zoom: u8,
	pub max_zoom: u8,
}

impl TileSetMetadata {
	pub fn new(name: &str, bounds: BoundingExtent, min_zoom: u8, max_zoom: u8) -> TileSetMetadata {
		TileSetMetadata {
			name: name.to_owned(),
			description: format!("Layer generated by tileharvest {}", env!("CARGO_PKG_VERSION")),
			version: String::from("1.0"),
			bounds,
			min_zoom,
			max_zoom,
		}
	}

	/// Key/value pairs as stored in the `metadata` table.
	pub fn entries(&self) -> Vec<(&'static str, String)> {
		vec![
			("name", self.name.clone()),
			("type", String::from("baselayer")),
			("version", self.version.clone()),
			("description", self.description.clone()),
			("format", String::from("png")),
			("bounds", self.bounds.to_bounds_string()),
			("minzoom", self.min_zoom.to_string()),
			("maxzoom", self.max_zoom.to_string()),
		]
	}
}
