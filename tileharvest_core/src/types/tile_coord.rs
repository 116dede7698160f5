//! Tile coordinates of a source matrix and the row flip between source and store numbering.
//!
//! Sources number rows top-down (row 0 is the northern edge), the tile store numbers them
//! bottom-up (TMS). [`invert_row`] converts in both directions.
//!
//! ```
//! use tileharvest_core::{TileCoord, invert_row};
//!
//! let coord = TileCoord::new(3, 5, 1, "EPSG:3857:3").unwrap();
//! assert_eq!(coord.tms_row(), 6);
//! assert_eq!(invert_row(invert_row(1, 3), 3), 1);
//! ```

use anyhow::{Result, ensure};
use std::fmt::{self, Debug};

/// Highest zoom level whose tile indices fit into `u32`.
pub const MAX_LEVEL: u8 = 30;

/// Converts a row between top-down (source) and bottom-up (TMS) numbering.
///
/// The function is its own inverse. `row` must be `< 2^level`.
pub fn invert_row(row: u32, level: u8) -> u32 {
	let max_index = (1u32 << level) - 1;
	debug_assert!(row <= max_index, "row {row} out of range for level {level}");
	max_index - row
}

/// A tile of a source tile matrix: column `x`, top-down row `y`, zoom `level`, and the
/// identifier of the matrix it belongs to (needed to address the tile at the source).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TileCoord {
	pub level: u8,
	pub x: u32,
	pub y: u32,
	pub matrix: String,
}

impl TileCoord {
	/// # Errors
	/// Returns an error if `level` exceeds [`MAX_LEVEL`] or `x`/`y` are outside `[0, 2^level - 1]`.
	pub fn new(level: u8, x: u32, y: u32, matrix: &str) -> Result<TileCoord> {
		ensure!(level <= MAX_LEVEL, "level ({level}) must be <= {MAX_LEVEL}");
		let max = 1u32 << level;
		ensure!(x < max, "x ({x}) out of bounds for level {level}");
		ensure!(y < max, "y ({y}) out of bounds for level {level}");
		Ok(TileCoord {
			level,
			x,
			y,
			matrix: matrix.to_owned(),
		})
	}

	/// Row in the bottom-up numbering used by the tile store.
	pub fn tms_row(&self) -> u32 {
		invert_row(self.y, self.level)
	}
}

impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TileCoord({}, [{}, {}], {})", self.level, self.x, self.y, self.matrix)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(0, 0, 0)]
	#[case(1, 0, 1)]
	#[case(1, 1, 0)]
	#[case(3, 2, 5)]
	#[case(10, 383, 640)]
	fn invert_row_cases(#[case] level: u8, #[case] row: u32, #[case] expected: u32) {
		assert_eq!(invert_row(row, level), expected);
	}

	#[test]
	fn invert_row_is_self_inverse() {
		for level in 0..=12u8 {
			let max = 1u32 << level;
			for row in [0, max / 3, max / 2, max - 1] {
				assert_eq!(invert_row(invert_row(row, level), level), row);
			}
		}
	}

	#[test]
	fn invert_row_at_max_level() {
		assert_eq!(invert_row(0, MAX_LEVEL), (1 << 30) - 1);
	}

	#[test]
	fn new_checks_bounds() {
		assert!(TileCoord::new(2, 3, 3, "2").is_ok());
		assert!(TileCoord::new(2, 4, 0, "2").is_err());
		assert!(TileCoord::new(2, 0, 4, "2").is_err());
		assert!(TileCoord::new(31, 0, 0, "31").is_err());
	}

	#[test]
	fn debug_format() {
		let c = TileCoord::new(4, 7, 9, "EPSG:3857:4").unwrap();
		assert_eq!(format!("{c:?}"), "TileCoord(4, [7, 9], EPSG:3857:4)");
		assert_eq!(c.tms_row(), 6);
	}
}
