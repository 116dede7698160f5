use anyhow::Result;
use async_trait::async_trait;
use image::DynamicImage;
use std::fmt::Debug;
use tileharvest_core::{LayerCapabilities, MapService, TileCoord};

/// Knows how to talk to one kind of tile service, e.g. WMTS.
#[async_trait]
pub trait TileSourceStrategy: Send + Sync + Debug {
	/// The `type` tag this strategy handles, upper case.
	fn service_type(&self) -> &str;

	/// Resolves what `service` offers for `matrix_set`. Failures are invalid requests.
	async fn open(&self, service: &MapService, matrix_set: &str) -> Result<Box<dyn ResolvedSource>>;
}

/// A service whose capabilities are known and whose tiles can be fetched.
#[async_trait]
pub trait ResolvedSource: Send + Sync + Debug {
	/// Requested layers that the service offers, bottom layer first.
	fn layers(&self) -> &[LayerCapabilities];

	/// Never fails; a tile that cannot be fetched or decoded is `None`.
	async fn fetch_tile(&self, layer: &str, coord: &TileCoord) -> Option<DynamicImage>;

	/// Size in bytes the tile would take in the store.
	async fn fetch_tile_size(&self, layer: &str, coord: &TileCoord) -> Option<u64>;
}
