//! Axis-aligned rectangles tagged with their spatial reference system.
//!
//! # Examples
//!
//! ```
//! use tileharvest_core::{BoundingExtent, Srs};
//!
//! let mut a = BoundingExtent::new(0.0, 0.0, 10.0, 10.0, Srs::wgs84()).unwrap();
//! let b = BoundingExtent::new(-5.0, 2.0, 4.0, 12.0, Srs::wgs84()).unwrap();
//! a.extend(&b).unwrap();
//! assert_eq!(a.as_array(), [-5.0, 0.0, 10.0, 12.0]);
//! ```

use super::Srs;
use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// A rectangle `[x_min, y_min, x_max, y_max]` in the units of `srs`.
///
/// Invariants: all values finite, `x_min <= x_max`, `y_min <= y_max`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawExtent")]
pub struct BoundingExtent {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
	pub srs: Srs,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawExtent {
	x_min: f64,
	y_min: f64,
	x_max: f64,
	y_max: f64,
	srs: Srs,
}

impl TryFrom<RawExtent> for BoundingExtent {
	type Error = anyhow::Error;
	fn try_from(raw: RawExtent) -> Result<Self> {
		BoundingExtent::new(raw.x_min, raw.y_min, raw.x_max, raw.y_max, raw.srs)
	}
}

impl BoundingExtent {
	pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64, srs: Srs) -> Result<BoundingExtent> {
		BoundingExtent {
			x_min,
			y_min,
			x_max,
			y_max,
			srs,
		}
		.checked()
	}

	/// Builds an extent from `[x_min, y_min, x_max, y_max]`.
	pub fn from_array(values: [f64; 4], srs: Srs) -> Result<BoundingExtent> {
		BoundingExtent::new(values[0], values[1], values[2], values[3], srs)
	}

	/// The whole world in geographic coordinates, used when a layer declares no bounding box.
	pub fn world_wgs84() -> BoundingExtent {
		BoundingExtent {
			x_min: -180.0,
			y_min: -90.0,
			x_max: 180.0,
			y_max: 90.0,
			srs: Srs::wgs84(),
		}
	}

	fn checked(self) -> Result<BoundingExtent> {
		ensure!(
			self.x_min.is_finite() && self.y_min.is_finite() && self.x_max.is_finite() && self.y_max.is_finite(),
			"extent {self:?} contains non-finite values"
		);
		ensure!(self.x_min <= self.x_max, "x_min ({}) must be <= x_max ({})", self.x_min, self.x_max);
		ensure!(self.y_min <= self.y_max, "y_min ({}) must be <= y_max ({})", self.y_min, self.y_max);
		Ok(self)
	}

	pub fn as_array(&self) -> [f64; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}

	pub fn center(&self) -> (f64, f64) {
		((self.x_min + self.x_max) / 2.0, (self.y_min + self.y_max) / 2.0)
	}

	/// Grows `self` to also cover `other`. Both must share the same SRS.
	pub fn extend(&mut self, other: &BoundingExtent) -> Result<()> {
		ensure!(
			self.srs.is_equivalent(&other.srs),
			"cannot merge extents in {} and {}",
			self.srs,
			other.srs
		);
		self.x_min = self.x_min.min(other.x_min);
		self.y_min = self.y_min.min(other.y_min);
		self.x_max = self.x_max.max(other.x_max);
		self.y_max = self.y_max.max(other.y_max);
		Ok(())
	}

	/// Comma separated `x_min,y_min,x_max,y_max`, the form MBTiles uses for `bounds`.
	pub fn to_bounds_string(&self) -> String {
		format!("{},{},{},{}", self.x_min, self.y_min, self.x_max, self.y_max)
	}
}

impl Debug for BoundingExtent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"[{}, {}, {}, {}] {}",
			self.x_min, self.y_min, self.x_max, self.y_max, self.srs
		)
	}
}
