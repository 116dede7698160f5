//! Builders for capabilities documents and a fake WMTS, used in tests.

use crate::{MockClient, wmts::capabilities_url};
use std::{collections::HashMap, fmt::Write};
use tileharvest_core::{Blob, TileMatrixLimits};
use tileharvest_image::{image2blob, test_images::solid};

struct LayerEntry {
	identifier: String,
	bbox: Option<[f64; 4]>,
	limits: Vec<TileMatrixLimits>,
}

/// Writes a minimal WMTS 1.0.0 capabilities document with one `EPSG:3857` matrix set link
/// per layer.
#[derive(Default)]
pub struct CapabilitiesBuilder {
	layers: Vec<LayerEntry>,
}

impl CapabilitiesBuilder {
	pub fn new() -> CapabilitiesBuilder {
		CapabilitiesBuilder::default()
	}

	pub fn layer(mut self, identifier: &str, bbox: Option<[f64; 4]>) -> CapabilitiesBuilder {
		self.layers.push(LayerEntry {
			identifier: identifier.to_owned(),
			bbox,
			limits: Vec::new(),
		});
		self
	}

	/// Adds limits to the most recently added layer.
	pub fn limits(mut self, matrix: &str, min_row: u32, max_row: u32, min_col: u32, max_col: u32) -> CapabilitiesBuilder {
		let limits = TileMatrixLimits::new(matrix, min_row, max_row, min_col, max_col).unwrap();
		self.layers.last_mut().unwrap().limits.push(limits);
		self
	}

	/// Adds full-world limits `EPSG:3857:{z}` for every level in `levels`.
	pub fn full_levels(mut self, levels: std::ops::RangeInclusive<u8>) -> CapabilitiesBuilder {
		for z in levels {
			let max = (1u32 << z) - 1;
			self = self.limits(&format!("EPSG:3857:{z}"), 0, max, 0, max);
		}
		self
	}

	pub fn build(&self) -> String {
		let mut xml = String::from(
			"<?xml version=\"1.0\"?>\n<Capabilities xmlns=\"http://www.opengis.net/wmts/1.0\" xmlns:ows=\"http://www.opengis.net/ows/1.1\" version=\"1.0.0\">\n<Contents>\n",
		);
		for layer in &self.layers {
			xml.push_str("<Layer>\n");
			if let Some([x0, y0, x1, y1]) = layer.bbox {
				writeln!(
					xml,
					"<ows:WGS84BoundingBox><ows:LowerCorner>{x0} {y0}</ows:LowerCorner><ows:UpperCorner>{x1} {y1}</ows:UpperCorner></ows:WGS84BoundingBox>"
				)
				.unwrap();
			}
			writeln!(xml, "<ows:Identifier>{}</ows:Identifier>", layer.identifier).unwrap();
			xml.push_str("<TileMatrixSetLink><TileMatrixSet>EPSG:3857</TileMatrixSet><TileMatrixSetLimits>\n");
			for l in &layer.limits {
				writeln!(
					xml,
					"<TileMatrixLimits><TileMatrix>{}</TileMatrix><MinTileRow>{}</MinTileRow><MaxTileRow>{}</MaxTileRow><MinTileCol>{}</MinTileCol><MaxTileCol>{}</MaxTileCol></TileMatrixLimits>",
					l.matrix, l.min_row, l.max_row, l.min_col, l.max_col
				)
				.unwrap();
			}
			xml.push_str("</TileMatrixSetLimits></TileMatrixSetLink>\n</Layer>\n");
		}
		xml.push_str("</Contents>\n</Capabilities>\n");
		xml
	}
}

/// A 256×256 single-color PNG tile.
pub fn png_tile(color: [u8; 4]) -> Blob {
	image2blob(&solid(256, 256, color)).unwrap()
}

/// Parses the query string of a GetTile URL into upper-cased keys.
pub fn query_params(url: &str) -> HashMap<String, String> {
	url.split_once('?')
		.map(|(_, q)| q)
		.unwrap_or_default()
		.split('&')
		.filter_map(|kv| kv.split_once('='))
		.map(|(k, v)| (k.to_ascii_uppercase(), v.to_owned()))
		.collect()
}

/// A mock WMTS at `url` serving `capabilities`. Every tile of a layer in `colors` is
/// answered with a solid tile of that color; other layers answer 404.
pub fn fake_wmts(url: &str, capabilities: &str, colors: &[(&str, [u8; 4])]) -> MockClient {
	let tiles: HashMap<String, Blob> = colors
		.iter()
		.map(|(layer, color)| ((*layer).to_owned(), png_tile(*color)))
		.collect();
	let prefix = format!("{url}?");
	MockClient::new()
		.with_response(&capabilities_url(url, "WMTS"), capabilities)
		.with_responder(move |requested| {
			if !requested.starts_with(&prefix) {
				return None;
			}
			let params = query_params(requested);
			if params.get("REQUEST").map(String::as_str) != Some("GetTile") {
				return None;
			}
			params.get("LAYER").and_then(|layer| tiles.get(layer)).cloned()
		})
}
