//! Predicts the size of a harvest by fetching a few sample tiles per layer and zoom level.
//!
//! Per zoom level up to five tiles are sampled: the two corners of the tile range, its
//! center, and the two diagonal neighbours of the center. Neighbours outside the tile
//! matrix are skipped. The mean PNG size of the samples that could be fetched stands in
//! for every tile of that level; a level without any successful sample counts as empty.

use crate::SourceRegistry;
use futures::future::join_all;
use std::sync::Arc;
use tileharvest_core::{
	CategorizeResult, ErrorCategory::*, HarvestRequest, HarvestResult, SizeEstimate, Srs, TileCoord, TileRange,
	calculate_grid, reproject_extent,
};

fn sample_coords(range: &TileRange) -> Vec<TileCoord> {
	let max_index = (1u32 << range.level) - 1;
	let (cx, cy) = range.center();
	let candidates = [
		(Some(range.min_col), Some(range.min_row)),
		(Some(range.max_col), Some(range.max_row)),
		(Some(cx), Some(cy)),
		(cx.checked_sub(1), cy.checked_add(1)),
		(cx.checked_add(1), cy.checked_sub(1)),
	];
	candidates
		.into_iter()
		.filter_map(|(x, y)| Some((x?, y?)))
		.filter(|&(x, y)| x <= max_index && y <= max_index)
		.map(|(x, y)| range.coord(x, y))
		.collect()
}

#[derive(Debug)]
pub struct SizeEstimator {
	registry: Arc<SourceRegistry>,
	matrix_set: String,
}

impl SizeEstimator {
	pub fn new(registry: Arc<SourceRegistry>, matrix_set: &str) -> SizeEstimator {
		SizeEstimator {
			registry,
			matrix_set: matrix_set.to_owned(),
		}
	}

	/// Estimates every service of `request` and combines the results.
	pub async fn estimate(&self, request: &HarvestRequest) -> HarvestResult<SizeEstimate> {
		request.validate().categorize(InvalidRequest)?;
		let extent = reproject_extent(&request.extent, &Srs::web_mercator()).categorize(InvalidRequest)?;

		let mut estimates = Vec::with_capacity(request.services.len());
		for service in &request.services {
			let source = self
				.registry
				.open(service, &self.matrix_set)
				.await
				.categorize(InvalidRequest)?;

			let mut tile_count = 0u64;
			let mut total_kb = 0.0;
			for layer in source.layers() {
				let grid = calculate_grid(layer, &extent, request.min_zoom, request.max_zoom).categorize(Internal)?;
				for range in grid.ranges() {
					let coords = sample_coords(range);
					let sizes: Vec<u64> = join_all(coords.iter().map(|c| source.fetch_tile_size(&layer.identifier, c)))
						.await
						.into_iter()
						.flatten()
						.collect();
					let average_bytes = if sizes.is_empty() {
						0.0
					} else {
						sizes.iter().sum::<u64>() as f64 / sizes.len() as f64
					};
					log::debug!(
						"layer '{}' level {}: {:.3} KB per tile from {} of {} samples, {} tiles",
						layer.identifier,
						range.level,
						average_bytes / 1024.0,
						sizes.len(),
						coords.len(),
						range.count_tiles()
					);
					total_kb += average_bytes / 1024.0 * range.count_tiles() as f64;
					tile_count += range.count_tiles();
				}
			}

			let estimate = SizeEstimate::from_total_kb(tile_count, total_kb);
			log::info!(
				"service '{}': {} tiles, {} KB per tile, {} MB",
				service.url,
				estimate.tile_count,
				estimate.average_tile_size_kb,
				estimate.estimated_store_size_mb
			);
			estimates.push(estimate);
		}
		Ok(SizeEstimate::combine_all(estimates))
	}
}
