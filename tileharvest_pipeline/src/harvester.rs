//! Runs one harvest job: resolve the services, walk the tile grids of every layer, merge the
//! fetched tiles into an MBTiles store and finalize it.
//!
//! A job moves through [`HarvestState`]s:
//! - **Initializing**: validate the request, resolve every service, compute the grids and
//!   publish `{total, 0}` progress.
//! - **Running**: services in request order, layers bottom first, coordinates column by
//!   column. Every coordinate counts as processed, whether or not a tile came back.
//! - **Finalizing**: write metadata and close the store.
//! - **Completed** or **Aborted**. A cancelled job leaves its store as it is, without metadata.
//!
//! The progress entry of the job is removed when it reaches a terminal state; the final
//! counts are part of the returned [`HarvestOutcome`].
//!
//! Fetching runs on the async runtime. Everything touching the store (SQLite, PNG coding,
//! compositing) runs on the blocking thread pool, one tile at a time.

use crate::{ResolvedSource, SourceRegistry};
use futures::{StreamExt, future, stream};
use std::{
	fmt::{self, Display},
	path::{Path, PathBuf},
	pin::pin,
	sync::Arc,
};
use tileharvest_container::{MBTilesStore, TileSetMetadata};
use tileharvest_core::{
	CancellationSignal, CategorizeResult, ErrorCategory::*, HarvestError, HarvestRequest, HarvestResult, JobId,
	ProgressRegistry, Srs, TileGrid, calculate_grid, reproject_extent,
};

/// Cancellation is additionally polled after every this many processed tiles.
const CANCEL_CHECK_INTERVAL: u64 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HarvestState {
	Initializing,
	Running,
	Finalizing,
	Completed,
	Aborted,
}

impl Display for HarvestState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			HarvestState::Initializing => "initializing",
			HarvestState::Running => "running",
			HarvestState::Finalizing => "finalizing",
			HarvestState::Completed => "completed",
			HarvestState::Aborted => "aborted",
		})
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HarvestSummary {
	pub output: PathBuf,
	pub total_tiles: u64,
	pub processed_tiles: u64,
	/// Processed tiles that were fetched and written.
	pub stored_tiles: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HarvestOutcome {
	Completed(HarvestSummary),
	Aborted(HarvestSummary),
}

impl HarvestOutcome {
	pub fn summary(&self) -> &HarvestSummary {
		match self {
			HarvestOutcome::Completed(s) | HarvestOutcome::Aborted(s) => s,
		}
	}

	pub fn state(&self) -> HarvestState {
		match self {
			HarvestOutcome::Completed(_) => HarvestState::Completed,
			HarvestOutcome::Aborted(_) => HarvestState::Aborted,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct HarvestOptions {
	/// Tile matrix set requested from every service.
	pub matrix_set: String,
	/// Tile fetches in flight per layer; 1 fetches strictly one after the other.
	pub fetch_concurrency: usize,
}

impl Default for HarvestOptions {
	fn default() -> Self {
		HarvestOptions {
			matrix_set: String::from("EPSG:3857"),
			fetch_concurrency: 4,
		}
	}
}

/// Runs store work on the blocking thread pool.
async fn on_store<T, F>(work: F) -> HarvestResult<T>
where
	F: FnOnce() -> anyhow::Result<T> + Send + 'static,
	T: Send + 'static,
{
	match tokio::task::spawn_blocking(work).await {
		Ok(result) => result.categorize(StoreIo),
		Err(e) => Err(HarvestError::Internal(format!("store task failed: {e}"))),
	}
}

/// One layer of one resolved service and the tiles to take from it.
struct LayerPlan {
	source: usize,
	layer: String,
	grid: TileGrid,
}

#[derive(Debug)]
pub struct Harvester {
	registry: Arc<SourceRegistry>,
	progress: ProgressRegistry,
	options: HarvestOptions,
}

impl Harvester {
	pub fn new(registry: Arc<SourceRegistry>, progress: ProgressRegistry, options: HarvestOptions) -> Harvester {
		Harvester {
			registry,
			progress,
			options,
		}
	}

	pub fn progress(&self) -> &ProgressRegistry {
		&self.progress
	}

	/// Harvests `request` into the MBTiles file at `output`.
	///
	/// Tiles already in `output` stay and are merged with the new ones.
	pub async fn run(
		&self,
		job_id: JobId,
		request: &HarvestRequest,
		output: &Path,
		cancel: &CancellationSignal,
	) -> HarvestResult<HarvestOutcome> {
		let result = self.run_keeping_progress(job_id, request, output, cancel).await;
		self.progress.clear(job_id);
		result
	}

	/// Like [`Harvester::run`], but the progress entry of the job is left in place. The caller
	/// reads the last counts from it, e.g. those of a job that failed, and then clears it.
	pub async fn run_keeping_progress(
		&self,
		job_id: JobId,
		request: &HarvestRequest,
		output: &Path,
		cancel: &CancellationSignal,
	) -> HarvestResult<HarvestOutcome> {
		let result = self.execute(job_id, request, output, cancel).await;
		match &result {
			Ok(outcome) => log::info!("job {job_id}: {}", outcome.state()),
			Err(e) => log::error!("job {job_id}: failed: {e}"),
		}
		result
	}

	async fn execute(
		&self,
		job_id: JobId,
		request: &HarvestRequest,
		output: &Path,
		cancel: &CancellationSignal,
	) -> HarvestResult<HarvestOutcome> {
		log::info!("job {job_id}: {}", HarvestState::Initializing);
		request.validate().categorize(InvalidRequest)?;
		let extent = reproject_extent(&request.extent, &Srs::web_mercator()).categorize(InvalidRequest)?;
		let mut bounds = reproject_extent(&request.extent, &Srs::wgs84()).categorize(InvalidRequest)?;

		let matrix_set = self.options.matrix_set.as_str();
		let mut sources: Vec<Box<dyn ResolvedSource>> = Vec::with_capacity(request.services.len());
		let mut plans = Vec::new();
		for service in &request.services {
			let source = self.registry.open(service, matrix_set).await.categorize(InvalidRequest)?;
			for layer in source.layers() {
				let grid = calculate_grid(layer, &extent, request.min_zoom, request.max_zoom).categorize(Internal)?;
				log::debug!("layer '{}': {} tiles", layer.identifier, grid.count_tiles());
				plans.push(LayerPlan {
					source: sources.len(),
					layer: layer.identifier.clone(),
					grid,
				});
				bounds.extend(&layer.geographic_extent).categorize(Internal)?;
			}
			sources.push(source);
		}

		let total_tiles: u64 = plans.iter().map(|p| p.grid.count_tiles()).sum();
		self.progress.start(job_id, total_tiles);
		let path = output.to_path_buf();
		let store = Arc::new(on_store(move || MBTilesStore::create(&path)).await?);

		log::info!("job {job_id}: {} {total_tiles} tiles into '{}'", HarvestState::Running, output.display());
		let mut summary = HarvestSummary {
			output: output.to_path_buf(),
			total_tiles,
			processed_tiles: 0,
			stored_tiles: 0,
		};
		let concurrency = self.options.fetch_concurrency.max(1);

		for plan in &plans {
			let source = sources[plan.source].as_ref();
			let layer = plan.layer.as_str();
			log::debug!("job {job_id}: harvesting layer '{layer}'");

			let tiles = stream::iter(plan.grid.iter_coords())
				.take_while(|_| future::ready(!cancel.is_cancelled()))
				.map(move |coord| async move {
					let image = source.fetch_tile(layer, &coord).await;
					(coord, image)
				})
				.buffered(concurrency);
			let mut tiles = pin!(tiles);

			loop {
				if cancel.is_cancelled() {
					return Ok(self.abort(job_id, summary));
				}
				let Some((coord, image)) = tiles.next().await else {
					break;
				};
				if let Some(image) = image {
					let store = Arc::clone(&store);
					on_store(move || store.put_tile(&coord, image)).await?;
					summary.stored_tiles += 1;
				}
				summary.processed_tiles += 1;
				self.progress.update(job_id, summary.processed_tiles);
				if summary.processed_tiles % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
					return Ok(self.abort(job_id, summary));
				}
			}
		}

		log::info!("job {job_id}: {}", HarvestState::Finalizing);
		let name = request.first_layer().unwrap_or_default();
		let metadata = TileSetMetadata::new(name, bounds, request.min_zoom, request.max_zoom);
		let store = Arc::into_inner(store).ok_or_else(|| HarvestError::Internal(String::from("tile store is still in use")))?;
		on_store(move || {
			store.write_metadata(&metadata)?;
			store.close()
		})
		.await?;
		log::info!(
			"job {job_id}: stored {} of {} tiles in '{}'",
			summary.stored_tiles,
			summary.total_tiles,
			output.display()
		);
		Ok(HarvestOutcome::Completed(summary))
	}

	fn abort(&self, job_id: JobId, summary: HarvestSummary) -> HarvestOutcome {
		log::warn!(
			"job {job_id}: cancelled after {} of {} tiles, '{}' is left without metadata",
			summary.processed_tiles,
			summary.total_tiles,
			summary.output.display()
		);
		HarvestOutcome::Aborted(summary)
	}
}
