use anyhow::{Context, Result, anyhow, ensure};
use clap::Args;
use std::path::PathBuf;
use tileharvest::read_request;
use tileharvest_core::{BoundingExtent, CategorizeResult, ErrorCategory, HarvestRequest, MapService, Srs};

/// What to harvest: a request file, or a single service given by flags.
#[derive(Args, Debug)]
pub struct RequestArgs {
	/// request file (YAML, or JSON if the name ends in .json)
	#[arg(long, short, value_name = "FILE", conflicts_with_all = ["url", "layers", "bbox"])]
	request: Option<PathBuf>,

	/// URL of the service, without query parameters for GetCapabilities/GetTile
	#[arg(long, requires_all = ["layers", "bbox", "min_zoom", "max_zoom"])]
	url: Option<String>,

	/// layers to harvest, bottom layer first
	#[arg(long, value_delimiter = ',', value_name = "LAYER,...")]
	layers: Vec<String>,

	/// extent as "x_min,y_min,x_max,y_max"
	#[arg(long, value_name = "X0,Y0,X1,Y1", allow_hyphen_values = true)]
	bbox: Option<String>,

	/// SRS of --bbox
	#[arg(long, default_value = "EPSG:4326")]
	srs: String,

	/// lowest zoom level to harvest
	#[arg(long)]
	min_zoom: Option<u8>,

	/// highest zoom level to harvest
	#[arg(long)]
	max_zoom: Option<u8>,

	/// service type of --url
	#[arg(long, default_value = "WMTS")]
	service_type: String,
}

fn parse_bbox(text: &str, srs: &str) -> Result<BoundingExtent> {
	let values = text
		.split(',')
		.map(|v| v.trim().parse::<f64>())
		.collect::<Result<Vec<f64>, _>>()
		.with_context(|| format!("invalid bbox '{text}'"))?;
	let values: [f64; 4] = values
		.try_into()
		.map_err(|v: Vec<f64>| anyhow!("bbox needs 4 values, got {}", v.len()))?;
	BoundingExtent::from_array(values, Srs::new(srs)?)
}

impl RequestArgs {
	pub fn to_request(&self) -> Result<HarvestRequest> {
		if let Some(path) = &self.request {
			return read_request(path);
		}
		let url = self.url.as_deref().context("either --request or --url is required")?;
		ensure!(!self.layers.is_empty(), "--layers is required");
		let bbox = self.bbox.as_deref().context("--bbox is required")?;
		let layers: Vec<&str> = self.layers.iter().map(String::as_str).collect();

		let request = HarvestRequest {
			services: vec![MapService::new(url, &layers, &self.service_type)],
			extent: parse_bbox(bbox, &self.srs)?,
			min_zoom: self.min_zoom.context("--min-zoom is required")?,
			max_zoom: self.max_zoom.context("--max-zoom is required")?,
		};
		request.validate().categorize(ErrorCategory::InvalidRequest)?;
		Ok(request)
	}
}
