//! Rectangular ranges of tiles, one per zoom level, and the grid they make up together.

use crate::TileCoord;
use itertools::Itertools;
use std::fmt::{self, Debug};

/// An inclusive column/row rectangle of one tile matrix. Rows are top-down.
#[derive(Clone, PartialEq, Eq)]
pub struct TileRange {
	pub level: u8,
	pub matrix: String,
	pub min_col: u32,
	pub max_col: u32,
	pub min_row: u32,
	pub max_row: u32,
}

impl TileRange {
	pub fn count_tiles(&self) -> u64 {
		u64::from(self.max_col - self.min_col + 1) * u64::from(self.max_row - self.min_row + 1)
	}

	pub fn contains(&self, x: u32, y: u32) -> bool {
		(self.min_col..=self.max_col).contains(&x) && (self.min_row..=self.max_row).contains(&y)
	}

	pub fn center(&self) -> (u32, u32) {
		(
			self.min_col + (self.max_col - self.min_col) / 2,
			self.min_row + (self.max_row - self.min_row) / 2,
		)
	}

	/// Iterates all coordinates, column by column, rows ascending within each column.
	pub fn iter_coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
		(self.min_col..=self.max_col)
			.cartesian_product(self.min_row..=self.max_row)
			.map(|(x, y)| self.coord(x, y))
	}

	/// Coordinate at column `x`, row `y` of this range's matrix. Bounds are not checked.
	pub fn coord(&self, x: u32, y: u32) -> TileCoord {
		TileCoord {
			level: self.level,
			x,
			y,
			matrix: self.matrix.clone(),
		}
	}
}

impl Debug for TileRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}: [{},{},{},{}] ({})",
			self.level, self.min_col, self.min_row, self.max_col, self.max_row, self.matrix
		)
	}
}

/// Tile ranges of one layer over a zoom interval, ascending by level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileGrid {
	ranges: Vec<TileRange>,
}

impl TileGrid {
	pub fn new(ranges: Vec<TileRange>) -> TileGrid {
		TileGrid { ranges }
	}

	pub fn ranges(&self) -> &[TileRange] {
		&self.ranges
	}

	pub fn count_tiles(&self) -> u64 {
		self.ranges.iter().map(TileRange::count_tiles).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.ranges.is_empty()
	}

	/// Lazily yields every coordinate of the grid, level by level.
	pub fn iter_coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
		self.ranges.iter().flat_map(TileRange::iter_coords)
	}

	pub fn into_iter_coords(self) -> impl Iterator<Item = TileCoord> {
		self.ranges.into_iter().flat_map(|range| {
			let r = range.clone();
			(range.min_col..=range.max_col)
				.cartesian_product(range.min_row..=range.max_row)
				.map(move |(x, y)| r.coord(x, y))
		})
	}
}
