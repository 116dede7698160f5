//! Merging of two tiles that land on the same coordinate.
//!
//! The existing tile is drawn first, the new tile on top of it with source-over alpha
//! blending, both anchored at the top-left corner of a transparent canvas as large as the
//! larger of the two in each dimension.

use image::{DynamicImage, RgbaImage, imageops::overlay};

/// Composites `top` over `bottom`. If either side is missing, the other is returned unchanged.
///
/// ```
/// use image::{DynamicImage, Rgba, RgbaImage};
/// use tileharvest_image::composite;
///
/// let red = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255])));
/// assert_eq!(composite(None, Some(red.clone())), Some(red));
/// assert_eq!(composite(None, None), None);
/// ```
pub fn composite(bottom: Option<DynamicImage>, top: Option<DynamicImage>) -> Option<DynamicImage> {
	match (bottom, top) {
		(None, top) => top,
		(bottom, None) => bottom,
		(Some(bottom), Some(top)) => Some(composite_pair(&bottom, &top)),
	}
}

fn composite_pair(bottom: &DynamicImage, top: &DynamicImage) -> DynamicImage {
	let width = bottom.width().max(top.width());
	let height = bottom.height().max(top.height());
	let mut canvas = RgbaImage::new(width, height);
	overlay(&mut canvas, &bottom.to_rgba8(), 0, 0);
	overlay(&mut canvas, &top.to_rgba8(), 0, 0);
	DynamicImage::ImageRgba8(canvas)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_images::{checkerboard, solid};
	use image::{GenericImageView, Rgba};
	use rstest::rstest;

	#[rstest]
	#[case(solid(4, 4, [1, 2, 3, 255]))]
	#[case(checkerboard(16))]
	fn missing_side_returns_the_other(#[case] img: DynamicImage) {
		assert_eq!(composite(None, Some(img.clone())), Some(img.clone()));
		assert_eq!(composite(Some(img.clone()), None), Some(img));
	}

	#[test]
	fn opaque_top_occludes_bottom() {
		let bottom = checkerboard(16);
		let top = solid(16, 16, [0, 0, 255, 255]);
		let result = composite(Some(bottom), Some(top.clone())).unwrap();
		assert_eq!(result.to_rgba8(), top.to_rgba8());
	}

	#[test]
	fn transparent_top_keeps_bottom() {
		let bottom = checkerboard(16);
		let top = solid(16, 16, [255, 0, 0, 0]);
		let result = composite(Some(bottom.clone()), Some(top)).unwrap();
		assert_eq!(result.to_rgba8(), bottom.to_rgba8());
	}

	#[test]
	fn half_transparent_top_blends() {
		let bottom = solid(1, 1, [0, 0, 0, 255]);
		let top = solid(1, 1, [255, 255, 255, 128]);
		let Rgba([r, g, b, a]) = composite(Some(bottom), Some(top)).unwrap().get_pixel(0, 0);
		assert_eq!(a, 255);
		assert!((120..=136).contains(&r), "r = {r}");
		assert_eq!((r, r), (g, b));
	}

	#[test]
	fn canvas_grows_to_the_larger_size() {
		let bottom = solid(4, 2, [10, 10, 10, 255]);
		let top = solid(2, 6, [200, 0, 0, 255]);
		let result = composite(Some(bottom), Some(top)).unwrap();
		assert_eq!(result.dimensions(), (4, 6));
		// covered by top
		assert_eq!(result.get_pixel(0, 0), Rgba([200, 0, 0, 255]));
		// only bottom
		assert_eq!(result.get_pixel(3, 1), Rgba([10, 10, 10, 255]));
		// neither
		assert_eq!(result.get_pixel(3, 5), Rgba([0, 0, 0, 0]));
	}
}
