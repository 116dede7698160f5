//! Synthetic tiles for tests.

use image::{DynamicImage, Rgba, RgbaImage};

pub fn solid(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
	DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
}

/// Opaque black and white squares of 8 pixels.
pub fn checkerboard(size: u32) -> DynamicImage {
	DynamicImage::ImageRgba8(RgbaImage::from_fn(size, size, |x, y| {
		if (x / 8 + y / 8) % 2 == 0 {
			Rgba([0, 0, 0, 255])
		} else {
			Rgba([255, 255, 255, 255])
		}
	}))
}
