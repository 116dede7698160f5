//! Decoding of whatever raster format a source answers with.

use anyhow::{Context, Result};
use image::{DynamicImage, load_from_memory};
use tileharvest_core::Blob;

/// Decodes PNG or JPEG by sniffing the payload, regardless of the requested format.
pub fn decode_any(blob: &Blob) -> Result<DynamicImage> {
	let format = image::guess_format(blob.as_slice()).context("unrecognized image payload")?;
	log::trace!("decoding {} byte {format:?} tile", blob.len());
	load_from_memory(blob.as_slice()).with_context(|| format!("failed to decode {format:?} tile"))
}
