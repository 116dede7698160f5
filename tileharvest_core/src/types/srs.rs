//! Spatial reference system identifiers such as `EPSG:4326`.

use anyhow::{Result, ensure};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
	fmt::{self, Debug, Display},
	str::FromStr,
	sync::LazyLock,
};

static SRS_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z]+:\d+$").unwrap());

const WEB_MERCATOR_ALIASES: [&str; 4] = ["EPSG:3857", "EPSG:900913", "EPSG:3785", "EPSG:102100"];
const GEOGRAPHIC_ALIASES: [&str; 2] = ["EPSG:4326", "CRS:84"];

/// An `AUTHORITY:CODE` identifier of a spatial reference system.
///
/// The authority part is compared case-insensitively; the stored form is upper case.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Srs(String);

impl Srs {
	pub fn new(code: &str) -> Result<Srs> {
		let code = code.trim();
		ensure!(
			SRS_PATTERN.is_match(code),
			"invalid SRS identifier '{code}', expected AUTHORITY:CODE like EPSG:4326"
		);
		Ok(Srs(code.to_ascii_uppercase()))
	}

	/// Geographic WGS 84 longitude/latitude in degrees.
	pub fn wgs84() -> Srs {
		Srs(String::from("EPSG:4326"))
	}

	/// Spherical Web Mercator in meters, the SRS of the tile store.
	pub fn web_mercator() -> Srs {
		Srs(String::from("EPSG:3857"))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn is_geographic(&self) -> bool {
		GEOGRAPHIC_ALIASES.contains(&self.0.as_str())
	}

	pub fn is_web_mercator(&self) -> bool {
		WEB_MERCATOR_ALIASES.contains(&self.0.as_str())
	}

	/// Whether both identifiers denote the same coordinate space, aliases included.
	pub fn is_equivalent(&self, other: &Srs) -> bool {
		self == other
			|| (self.is_geographic() && other.is_geographic())
			|| (self.is_web_mercator() && other.is_web_mercator())
	}
}

impl FromStr for Srs {
	type Err = anyhow::Error;
	fn from_str(s: &str) -> Result<Self> {
		Srs::new(s)
	}
}

impl TryFrom<String> for Srs {
	type Error = anyhow::Error;
	fn try_from(value: String) -> Result<Self> {
		Srs::new(&value)
	}
}

impl From<Srs> for String {
	fn from(value: Srs) -> Self {
		value.0
	}
}

impl Display for Srs {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl Debug for Srs {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
