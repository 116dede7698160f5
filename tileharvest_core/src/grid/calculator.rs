//! Derives the tile ranges covering an extent from a layer's declared matrix limits.
//!
//! The grid is the Web Mercator one with 256 pixel tiles and its origin in the north-west
//! corner. A tile is selected when its bounds overlap the extent; tiles that only touch the
//! extent along an edge count as overlapping.

use super::{TileGrid, TileRange};
use crate::{BoundingExtent, LayerCapabilities, TileMatrixLimits, web_mercator::HALF_WORLD};
use anyhow::{Result, ensure};

pub const TILE_SIZE: f64 = 256.0;
pub const ORIGIN_X: f64 = -HALF_WORLD;
pub const ORIGIN_Y: f64 = HALF_WORLD;
pub const GLOBAL_SIZE: f64 = 2.0 * HALF_WORLD;

/// Meters per pixel at `level`.
pub fn resolution(level: u8) -> f64 {
	GLOBAL_SIZE / (TILE_SIZE * 2f64.powi(i32::from(level)))
}

fn column_overlaps(x: u32, level: u8, extent: &BoundingExtent) -> bool {
	let span = TILE_SIZE * resolution(level);
	let min_x = ORIGIN_X + f64::from(x) * span;
	let max_x = ORIGIN_X + (f64::from(x) + 1.0) * span;
	!(max_x < extent.x_min || min_x > extent.x_max)
}

fn row_overlaps(y: u32, level: u8, extent: &BoundingExtent) -> bool {
	let span = TILE_SIZE * resolution(level);
	let max_y = ORIGIN_Y - f64::from(y) * span;
	let min_y = ORIGIN_Y - (f64::from(y) + 1.0) * span;
	!(max_y < extent.y_min || min_y > extent.y_max)
}

/// Narrows `[lo, hi]` to the indices where `overlaps` holds.
///
/// `estimate` gives a first guess for the first and last overlapping index; it is corrected
/// with the exact predicate, so the result does not depend on rounding in the estimate.
fn narrow(lo: u32, hi: u32, estimate: (f64, f64), overlaps: impl Fn(u32) -> bool) -> Option<(u32, u32)> {
	let guess = |v: f64| -> u32 {
		if v.is_nan() {
			lo
		} else {
			v.clamp(f64::from(lo), f64::from(hi)) as u32
		}
	};

	let mut first = guess(estimate.0);
	while first > lo && overlaps(first - 1) {
		first -= 1;
	}
	while first <= hi && !overlaps(first) {
		if first == hi {
			return None;
		}
		first += 1;
	}

	let mut last = guess(estimate.1).max(first);
	while last < hi && overlaps(last + 1) {
		last += 1;
	}
	while last > first && !overlaps(last) {
		last -= 1;
	}
	Some((first, last))
}

/// The part of `limits` whose tiles overlap `extent` (Web Mercator meters), or `None`.
///
/// Limits are first clamped to the valid index range `[0, 2^level - 1]`.
pub fn tile_range_for(limits: &TileMatrixLimits, extent: &BoundingExtent) -> Option<TileRange> {
	let level = limits.level;
	let max_index = (1u32 << level) - 1;
	let (col_lo, col_hi) = (limits.min_col.min(max_index), limits.max_col.min(max_index));
	let (row_lo, row_hi) = (limits.min_row.min(max_index), limits.max_row.min(max_index));
	if limits.min_col > max_index || limits.min_row > max_index {
		return None;
	}

	let span = TILE_SIZE * resolution(level);
	let (min_col, max_col) = narrow(
		col_lo,
		col_hi,
		(
			((extent.x_min - ORIGIN_X) / span - 1.0).ceil(),
			((extent.x_max - ORIGIN_X) / span).floor(),
		),
		|x| column_overlaps(x, level, extent),
	)?;
	let (min_row, max_row) = narrow(
		row_lo,
		row_hi,
		(
			((ORIGIN_Y - extent.y_max) / span - 1.0).ceil(),
			((ORIGIN_Y - extent.y_min) / span).floor(),
		),
		|y| row_overlaps(y, level, extent),
	)?;

	Some(TileRange {
		level,
		matrix: limits.matrix.clone(),
		min_col,
		max_col,
		min_row,
		max_row,
	})
}

/// Computes the tile grid of `layer` over `extent` for every level in `min_zoom..=max_zoom`.
///
/// `extent` must be in Web Mercator. Levels without declared limits contribute nothing.
pub fn calculate_grid(
	layer: &LayerCapabilities,
	extent: &BoundingExtent,
	min_zoom: u8,
	max_zoom: u8,
) -> Result<TileGrid> {
	ensure!(
		extent.srs.is_web_mercator(),
		"tile grid needs a Web Mercator extent, got {}",
		extent.srs
	);
	let mut ranges = Vec::new();
	for level in min_zoom..=max_zoom {
		let Some(limits) = layer.limits_for_level(level) else {
			log::debug!("layer '{}' declares no tile matrix for level {level}", layer.identifier);
			continue;
		};
		match tile_range_for(limits, extent) {
			Some(range) => {
				log::trace!("layer '{}' level {level}: {range:?}", layer.identifier);
				ranges.push(range);
			}
			None => log::debug!("layer '{}' has no tiles at level {level} inside {extent:?}", layer.identifier),
		}
	}
	Ok(TileGrid::new(ranges))
}
