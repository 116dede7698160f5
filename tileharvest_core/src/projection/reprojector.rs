//! Extent reprojection.
//!
//! The lower-left and upper-right corners are transformed independently. Geographic WGS 84
//! and Web Mercator are handled natively and each corner keeps its slot. With the `proj`
//! feature (on by default in the `tileharvest` binary) every other pair PROJ knows is
//! supported as well; there the transformed corners are sorted into min/max order, since
//! such a projection may mirror an axis.
//!
//! ```
//! use tileharvest_core::{BoundingExtent, Srs, reproject_extent};
//!
//! let geo = BoundingExtent::new(-180.0, 0.0, 0.0, 10.0, Srs::wgs84()).unwrap();
//! let merc = reproject_extent(&geo, &Srs::web_mercator()).unwrap();
//! assert_eq!(merc.srs, Srs::web_mercator());
//! assert!((merc.x_min + 20037508.3427892).abs() < 1e-6);
//! ```

use super::web_mercator;
use crate::{BoundingExtent, HarvestError, Srs};
use anyhow::{Context, Result};

/// Returns `extent` expressed in `target`. Equivalent SRS only relabel the extent.
pub fn reproject_extent(extent: &BoundingExtent, target: &Srs) -> Result<BoundingExtent> {
	let source = &extent.srs;
	if source.is_equivalent(target) {
		let mut result = extent.clone();
		result.srs = target.clone();
		return Ok(result);
	}

	let transform: fn(f64, f64) -> (f64, f64) = if source.is_geographic() && target.is_web_mercator() {
		web_mercator::from_wgs84
	} else if source.is_web_mercator() && target.is_geographic() {
		web_mercator::to_wgs84
	} else {
		return reproject_external(extent, target);
	};

	let (x_min, y_min) = transform(extent.x_min, extent.y_min);
	let (x_max, y_max) = transform(extent.x_max, extent.y_max);
	log::trace!("reprojected {extent:?} to [{x_min}, {y_min}, {x_max}, {y_max}] {target}");
	BoundingExtent::new(x_min, y_min, x_max, y_max, target.clone())
		.with_context(|| format!("reprojecting {extent:?} to {target}"))
}

#[cfg(feature = "proj")]
fn reproject_external(extent: &BoundingExtent, target: &Srs) -> Result<BoundingExtent> {
	use proj::Proj;

	let transformer = Proj::new_known_crs(extent.srs.as_str(), target.as_str(), None).map_err(|e| {
		HarvestError::InvalidRequest(format!("no transformation from {} to {target}: {e}", extent.srs))
	})?;
	let convert = |x: f64, y: f64| {
		transformer.convert((x, y)).map_err(|e| {
			HarvestError::InvalidRequest(format!("cannot transform ({x}, {y}) from {} to {target}: {e}", extent.srs))
		})
	};
	let (x0, y0) = convert(extent.x_min, extent.y_min)?;
	let (x1, y1) = convert(extent.x_max, extent.y_max)?;

	// projections may mirror an axis
	BoundingExtent::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1), target.clone())
		.with_context(|| format!("reprojecting {extent:?} to {target}"))
}

#[cfg(not(feature = "proj"))]
fn reproject_external(extent: &BoundingExtent, target: &Srs) -> Result<BoundingExtent> {
	Err(HarvestError::InvalidRequest(format!(
		"unsupported SRS pair {} -> {target}; build with the `proj` feature for general reprojection",
		extent.srs
	))
	.into())
}
