//! Reading harvest requests from files.

use anyhow::{Context, Result};
use std::{fs, path::Path};
use tileharvest_core::{CategorizeResult, ErrorCategory, HarvestRequest};

/// Parses a request from JSON (`*.json`) or YAML (anything else) and validates it.
pub fn read_request(path: &Path) -> Result<HarvestRequest> {
	let text = fs::read_to_string(path).with_context(|| format!("reading request file '{}'", path.display()))?;
	let is_json = path
		.extension()
		.is_some_and(|e| e.eq_ignore_ascii_case("json"));
	parse_request(&text, is_json).with_context(|| format!("parsing request file '{}'", path.display()))
}

pub fn parse_request(text: &str, is_json: bool) -> Result<HarvestRequest> {
	let request: HarvestRequest = if is_json {
		serde_json::from_str(text)?
	} else {
		serde_yaml_ng::from_str(text)?
	};
	request.validate().categorize(ErrorCategory::InvalidRequest)?;
	Ok(request)
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_fs::{NamedTempFile, prelude::*};
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	#[test]
	fn yaml_request_file() -> Result<()> {
		let request = read_request(Path::new("testdata/request.yml"))?;
		assert_eq!(request.services[0].layers, vec!["ortho", "labels"]);
		assert_eq!(request.services[0].service_type, "WMTS");
		assert_eq!(request.extent.as_array(), [1.9, 41.2, 2.3, 41.5]);
		assert_eq!((request.min_zoom, request.max_zoom), (10, 14));
		Ok(())
	}

	#[test]
	fn json_request_file() -> Result<()> {
		let file = NamedTempFile::new("request.json")?;
		file.write_str(
			r#"{"services":[{"url":"http://a/wmts","layers":["x"]}],
			"extent":{"x_min":0,"y_min":0,"x_max":1,"y_max":1,"srs":"EPSG:4326"},
			"min_zoom":0,"max_zoom":3}"#,
		)?;
		let request = read_request(file.path())?;
		assert_eq!(request.services[0].service_type, "WMTS");
		assert_eq!(request.max_zoom, 3);
		Ok(())
	}

	#[rstest]
	#[case::zoom_order("min_zoom: 5\nmax_zoom: 4")]
	#[case::too_deep("min_zoom: 0\nmax_zoom: 31")]
	fn invalid_request(#[case] zooms: &str) {
		let yaml = format!(
			"services: [{{url: 'http://a/wmts', layers: [x]}}]\nextent: {{x_min: 0, y_min: 0, x_max: 1, y_max: 1, srs: 'EPSG:4326'}}\n{zooms}"
		);
		assert!(parse_request(&yaml, false).is_err());
	}

	#[test]
	fn unknown_field() {
		let yaml = "services: []\nextent: {x_min: 0, y_min: 0, x_max: 1, y_max: 1, srs: 'EPSG:4326'}\nmin_zoom: 0\nmax_zoom: 1\nformat: png";
		assert!(parse_request(yaml, false).is_err());
	}
}
