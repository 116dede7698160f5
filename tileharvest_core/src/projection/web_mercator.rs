//! Spherical Web Mercator (EPSG:3857) constants and point transforms.

use std::f64::consts::PI;

/// Sphere radius in meters.
pub const RADIUS: f64 = 6_378_137.0;

/// Half the width of the projected world; also the origin offset of the tile grid.
pub const HALF_WORLD: f64 = 20037508.3427892;

/// Latitude at which the projected square ends.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Longitude/latitude in degrees to Web Mercator meters.
///
/// Latitudes beyond [`MAX_LATITUDE`] are clamped so the result stays finite.
pub fn from_wgs84(lon: f64, lat: f64) -> (f64, f64) {
	let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
	let x = lon.to_radians() * RADIUS;
	let y = (PI / 4.0 + lat.to_radians() / 2.0).tan().ln() * RADIUS;
	(x, y)
}

/// Web Mercator meters to longitude/latitude in degrees.
pub fn to_wgs84(x: f64, y: f64) -> (f64, f64) {
	let lon = (x / RADIUS).to_degrees();
	let lat = (2.0 * (y / RADIUS).exp().atan() - PI / 2.0).to_degrees();
	(lon, lat)
}
