//! PNG, the storage format of every tile in the store.

use anyhow::{Result, anyhow};
use image::{
	DynamicImage, ImageEncoder, ImageFormat,
	codecs::png::{CompressionType, FilterType, PngEncoder},
	load_from_memory_with_format,
};
use std::borrow::Cow;
use tileharvest_core::Blob;

/// Narrows 16-bit and float images to 8 bits per channel, keeping the channel layout.
fn to_8bit(image: &DynamicImage) -> Cow<'_, DynamicImage> {
	let color = image.color();
	if color.bytes_per_pixel() == color.channel_count() {
		return Cow::Borrowed(image);
	}
	log::trace!("narrowing {color:?} image to 8 bits per channel");
	Cow::Owned(match (color.has_color(), color.has_alpha()) {
		(false, false) => DynamicImage::ImageLuma8(image.to_luma8()),
		(false, true) => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
		(true, false) => DynamicImage::ImageRgb8(image.to_rgb8()),
		(true, true) => DynamicImage::ImageRgba8(image.to_rgba8()),
	})
}

/// Encodes `image` as PNG. Images with more than 8 bits per channel are narrowed first.
pub fn image2blob(image: &DynamicImage) -> Result<Blob> {
	let image = to_8bit(image);

	let mut buffer: Vec<u8> = Vec::new();
	PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, FilterType::Adaptive).write_image(
		image.as_bytes(),
		image.width(),
		image.height(),
		image.color().into(),
	)?;

	Ok(Blob::from(buffer))
}

pub fn blob2image(blob: &Blob) -> Result<DynamicImage> {
	load_from_memory_with_format(blob.as_slice(), ImageFormat::Png)
		.map_err(|e| anyhow!("Failed to decode PNG image: {e}"))
}
