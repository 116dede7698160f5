//! Predicted size of a tile store, and how estimates of several services add up.

use serde::Serialize;

/// Rounds half away from zero to three decimals.
pub fn round3(value: f64) -> f64 {
	(value * 1000.0).round() / 1000.0
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SizeEstimate {
	pub tile_count: u64,
	pub average_tile_size_kb: f64,
	pub estimated_store_size_mb: f64,
}

impl SizeEstimate {
	/// Builds the estimate of one service from its tile count and the summed estimated size in KB.
	///
	/// ```
	/// use tileharvest_core::SizeEstimate;
	///
	/// let e = SizeEstimate::from_total_kb(3, 10.0);
	/// assert_eq!(e.average_tile_size_kb, 3.333);
	/// assert_eq!(e.estimated_store_size_mb, 0.01);
	/// ```
	pub fn from_total_kb(tile_count: u64, total_kb: f64) -> SizeEstimate {
		let average = if tile_count == 0 {
			0.0
		} else {
			total_kb / tile_count as f64
		};
		SizeEstimate {
			tile_count,
			average_tile_size_kb: round3(average),
			estimated_store_size_mb: round3(total_kb / 1024.0),
		}
	}

	/// Adds `other` to `self`: counts and store sizes are summed, the tile size becomes the
	/// tile-count-weighted average of both (0 when no tiles are counted at all).
	pub fn combine(self, other: SizeEstimate) -> SizeEstimate {
		let tile_count = self.tile_count + other.tile_count;
		let average_tile_size_kb = if tile_count > 0 {
			(self.average_tile_size_kb * self.tile_count as f64 + other.average_tile_size_kb * other.tile_count as f64)
				/ tile_count as f64
		} else {
			0.0
		};
		SizeEstimate {
			tile_count,
			average_tile_size_kb,
			estimated_store_size_mb: self.estimated_store_size_mb + other.estimated_store_size_mb,
		}
	}

	pub fn combine_all(estimates: impl IntoIterator<Item = SizeEstimate>) -> SizeEstimate {
		estimates.into_iter().fold(SizeEstimate::default(), SizeEstimate::combine)
	}
}
