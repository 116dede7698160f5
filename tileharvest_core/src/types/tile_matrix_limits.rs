//! Row and column limits of one tile matrix, as announced by a WMTS layer.

use super::MAX_LEVEL;
use anyhow::{Result, ensure};
use regex::Regex;
use std::sync::LazyLock;

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Derives the zoom level from a tile matrix identifier.
///
/// The level is the last run of decimal digits in the identifier, or 0 when there is none:
/// `"EPSG:3857:10"` and `"10"` give 10, `"top"` gives 0.
///
/// ```
/// use tileharvest_core::parse_level;
///
/// assert_eq!(parse_level("EPSG:3857:10").unwrap(), 10);
/// assert_eq!(parse_level("GoogleMapsCompatible:07").unwrap(), 7);
/// assert_eq!(parse_level("top").unwrap(), 0);
/// ```
pub fn parse_level(identifier: &str) -> Result<u8> {
	let Some(digits) = DIGIT_RUN.find_iter(identifier).last() else {
		return Ok(0);
	};
	let level: u64 = digits.as_str().parse().unwrap_or(u64::MAX);
	ensure!(
		level <= u64::from(MAX_LEVEL),
		"tile matrix '{identifier}' implies level {}, which exceeds {MAX_LEVEL}",
		digits.as_str()
	);
	Ok(level as u8)
}

/// Inclusive row/column range served for one tile matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMatrixLimits {
	/// Tile matrix identifier, e.g. `"EPSG:3857:10"`.
	pub matrix: String,
	pub level: u8,
	pub min_row: u32,
	pub max_row: u32,
	pub min_col: u32,
	pub max_col: u32,
}

impl TileMatrixLimits {
	/// Creates limits for `matrix`, deriving the level from its identifier.
	pub fn new(matrix: &str, min_row: u32, max_row: u32, min_col: u32, max_col: u32) -> Result<TileMatrixLimits> {
		ensure!(min_row <= max_row, "{matrix}: min_row ({min_row}) > max_row ({max_row})");
		ensure!(min_col <= max_col, "{matrix}: min_col ({min_col}) > max_col ({max_col})");
		Ok(TileMatrixLimits {
			matrix: matrix.to_owned(),
			level: parse_level(matrix)?,
			min_row,
			max_row,
			min_col,
			max_col,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("EPSG:3857:10", 10)]
	#[case("10", 10)]
	#[case("EPSG:3857:0", 0)]
	#[case("no digits", 0)]
	#[case("L05", 5)]
	fn level_from_identifier(#[case] identifier: &str, #[case] expected: u8) {
		assert_eq!(parse_level(identifier).unwrap(), expected);
	}

	#[test]
	fn bare_srs_code_is_not_a_level() {
		assert!(parse_level("EPSG:3857").is_err());
	}

	#[test]
	fn overflowing_digit_runs_are_rejected() {
		assert!(parse_level("31").is_err());
		assert!(parse_level("99999999999999999999999").is_err());
	}

	#[test]
	fn new_checks_ranges() {
		let limits = TileMatrixLimits::new("EPSG:3857:5", 10, 12, 3, 4).unwrap();
		assert_eq!(limits.level, 5);
		assert!(TileMatrixLimits::new("5", 12, 10, 3, 4).is_err());
		assert!(TileMatrixLimits::new("5", 10, 12, 4, 3).is_err());
	}
}
