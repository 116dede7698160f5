//! Request URLs of the WMTS key-value-pair encoding.

use tileharvest_core::TileCoord;

fn separator(url: &str) -> char {
	if url.contains('?') { '&' } else { '?' }
}

/// `{url}?SERVICE={service_type}&REQUEST=GetCapabilities`
pub fn capabilities_url(url: &str, service_type: &str) -> String {
	format!("{url}{}SERVICE={service_type}&REQUEST=GetCapabilities", separator(url))
}

/// GetTile request for `coord` of `layer`; rows are in source (top-down) numbering.
pub fn tile_url(url: &str, layer: &str, matrix_set: &str, coord: &TileCoord) -> String {
	format!(
		"{url}{}SERVICE=WMTS&VERSION=1.0.0&REQUEST=GetTile&LAYER={layer}&TILEMATRIXSET={matrix_set}&TILEMATRIX={}&TILEROW={}&TILECOL={}&FORMAT=image/png",
		separator(url),
		coord.matrix,
		coord.y,
		coord.x
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn capabilities() {
		assert_eq!(
			capabilities_url("https://geo.example.org/wmts", "WMTS"),
			"https://geo.example.org/wmts?SERVICE=WMTS&REQUEST=GetCapabilities"
		);
		assert_eq!(
			capabilities_url("https://geo.example.org/wmts?token=abc", "WMTS"),
			"https://geo.example.org/wmts?token=abc&SERVICE=WMTS&REQUEST=GetCapabilities"
		);
	}

	#[test]
	fn get_tile() {
		let coord = TileCoord::new(10, 517, 383, "EPSG:3857:10").unwrap();
		assert_eq!(
			tile_url("http://t/wmts", "ortho", "EPSG:3857", &coord),
			"http://t/wmts?SERVICE=WMTS&VERSION=1.0.0&REQUEST=GetTile&LAYER=ortho&TILEMATRIXSET=EPSG:3857&TILEMATRIX=EPSG:3857:10&TILEROW=383&TILECOL=517&FORMAT=image/png"
		);
	}
}
