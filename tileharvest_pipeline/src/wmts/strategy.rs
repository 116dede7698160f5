use super::{TileFetcher, resolve_capabilities};
use crate::{ResolvedSource, SourceClient, TileSourceStrategy};
use anyhow::Result;
use async_trait::async_trait;
use image::DynamicImage;
use std::sync::Arc;
use tileharvest_core::{LayerCapabilities, MapService, TileCoord};

/// Strategy for services of type `WMTS`, using the KVP encoding.
#[derive(Debug)]
pub struct WmtsStrategy {
	client: Arc<dyn SourceClient>,
}

impl WmtsStrategy {
	pub fn new(client: Arc<dyn SourceClient>) -> WmtsStrategy {
		WmtsStrategy { client }
	}
}

#[async_trait]
impl TileSourceStrategy for WmtsStrategy {
	fn service_type(&self) -> &str {
		"WMTS"
	}

	async fn open(&self, service: &MapService, matrix_set: &str) -> Result<Box<dyn ResolvedSource>> {
		let layers = resolve_capabilities(self.client.as_ref(), service, matrix_set).await?;
		log::info!(
			"service '{}' offers {} of {} requested layers",
			service.url,
			layers.len(),
			service.layers.len()
		);
		Ok(Box::new(WmtsSource {
			layers,
			fetcher: TileFetcher::new(Arc::clone(&self.client), &service.url, matrix_set),
		}))
	}
}

#[derive(Debug)]
struct WmtsSource {
	layers: Vec<LayerCapabilities>,
	fetcher: TileFetcher,
}

#[async_trait]
impl ResolvedSource for WmtsSource {
	fn layers(&self) -> &[LayerCapabilities] {
		&self.layers
	}

	async fn fetch_tile(&self, layer: &str, coord: &TileCoord) -> Option<DynamicImage> {
		self.fetcher.fetch_image(layer, coord).await
	}

	async fn fetch_tile_size(&self, layer: &str, coord: &TileCoord) -> Option<u64> {
		self.fetcher.fetch_png_size(layer, coord).await
	}
}
