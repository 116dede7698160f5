use super::{BoundingExtent, TileMatrixLimits};

/// What a source announces for one layer: its identifier, the per-matrix limits for the
/// requested matrix set (in document order) and its geographic extent in EPSG:4326.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerCapabilities {
	pub identifier: String,
	pub limits: Vec<TileMatrixLimits>,
	pub geographic_extent: BoundingExtent,
}

impl LayerCapabilities {
	/// The first limits entry whose derived level equals `level`.
	pub fn limits_for_level(&self, level: u8) -> Option<&TileMatrixLimits> {
		self.limits.iter().find(|l| l.level == level)
	}
}
