//! Fetching single tiles from a WMTS.
//!
//! A harvest must survive missing or broken tiles, so nothing here returns an error: every
//! failure is logged and reported as "no tile".

use super::tile_url;
use crate::SourceClient;
use image::DynamicImage;
use std::sync::Arc;
use tileharvest_core::{Blob, TileCoord};
use tileharvest_image::{decode_any, image2blob};

#[derive(Clone, Debug)]
pub struct TileFetcher {
	client: Arc<dyn SourceClient>,
	url: String,
	matrix_set: String,
}

impl TileFetcher {
	pub fn new(client: Arc<dyn SourceClient>, url: &str, matrix_set: &str) -> TileFetcher {
		TileFetcher {
			client,
			url: url.to_owned(),
			matrix_set: matrix_set.to_owned(),
		}
	}

	async fn fetch_blob(&self, layer: &str, coord: &TileCoord) -> Option<Blob> {
		let url = tile_url(&self.url, layer, &self.matrix_set, coord);
		match self.client.get(&url).await {
			Ok(blob) => Some(blob),
			Err(e) => {
				log::warn!("tile {coord:?} of '{layer}' not fetched: {e:#}");
				None
			}
		}
	}

	/// Fetches and decodes one tile; `None` on transport, status or decoding failure.
	pub async fn fetch_image(&self, layer: &str, coord: &TileCoord) -> Option<DynamicImage> {
		let blob = self.fetch_blob(layer, coord).await?;
		match decode_any(&blob) {
			Ok(image) => Some(image),
			Err(e) => {
				log::warn!("tile {coord:?} of '{layer}' is not an image: {e:#}");
				None
			}
		}
	}

	/// Size in bytes of the tile as it would be stored, i.e. re-encoded as PNG.
	pub async fn fetch_png_size(&self, layer: &str, coord: &TileCoord) -> Option<u64> {
		let image = self.fetch_image(layer, coord).await?;
		match image2blob(&image) {
			Ok(blob) => Some(blob.len()),
			Err(e) => {
				log::warn!("tile {coord:?} of '{layer}' could not be encoded: {e:#}");
				None
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{MockClient, wmts::fixtures::png_tile};
	use image::{GenericImageView, ImageBuffer, ImageFormat, Luma, Rgba};

	fn coord() -> TileCoord {
		TileCoord::new(2, 1, 3, "EPSG:3857:2").unwrap()
	}

	#[tokio::test]
	async fn fetches_and_decodes() {
		let client = MockClient::new().with_responder(|url| url.contains("LAYER=ortho").then(|| png_tile([1, 2, 3, 255])));
		let fetcher = TileFetcher::new(Arc::new(client.clone()), "http://t/wmts", "EPSG:3857");
		let image = fetcher.fetch_image("ortho", &coord()).await.unwrap();
		assert_eq!(image.get_pixel(10, 10), Rgba([1, 2, 3, 255]));
		assert_eq!(client.count_requests("TILEROW=3&TILECOL=1"), 1);
	}

	#[tokio::test]
	async fn missing_tile_is_none() {
		let fetcher = TileFetcher::new(Arc::new(MockClient::new()), "http://t/wmts", "EPSG:3857");
		assert!(fetcher.fetch_image("ortho", &coord()).await.is_none());
		assert!(fetcher.fetch_png_size("ortho", &coord()).await.is_none());
	}

	#[tokio::test]
	async fn garbage_body_is_none() {
		let client = MockClient::new().with_responder(|_| Some(Blob::from("<ExceptionReport/>")));
		let fetcher = TileFetcher::new(Arc::new(client), "http://t/wmts", "EPSG:3857");
		assert!(fetcher.fetch_image("ortho", &coord()).await.is_none());
	}

	#[tokio::test]
	async fn png_size_matches_reencoded_tile() {
		let tile = png_tile([50, 60, 70, 255]);
		let expected = tile.len();
		let client = MockClient::new().with_responder(move |_| Some(tile.clone()));
		let fetcher = TileFetcher::new(Arc::new(client), "http://t/wmts", "EPSG:3857");
		assert_eq!(fetcher.fetch_png_size("ortho", &coord()).await, Some(expected));
	}

	#[tokio::test]
	async fn sixteen_bit_tile_is_sized_as_8_bit_png() {
		let deep = DynamicImage::ImageLuma16(ImageBuffer::from_pixel(256, 256, Luma([0x4000u16])));
		let mut body = std::io::Cursor::new(Vec::new());
		deep.write_to(&mut body, ImageFormat::Png).unwrap();
		let body = Blob::from(body.into_inner());
		let expected = image2blob(&DynamicImage::ImageLuma8(deep.to_luma8())).unwrap().len();

		let client = MockClient::new().with_responder(move |_| Some(body.clone()));
		let fetcher = TileFetcher::new(Arc::new(client), "http://t/wmts", "EPSG:3857");
		assert_eq!(fetcher.fetch_png_size("elevation", &coord()).await, Some(expected));
	}
}
