//! Bounded pool of harvest jobs.
//!
//! Jobs are accepted immediately and queued; at most `workers` of them run at the same
//! time. While a job runs its counters come from the shared [`ProgressRegistry`](tileharvest_core::ProgressRegistry). When it
//! ends, the last counts are written into the job's status first and the registry entry is
//! removed after that, so observed counts never drop. A failed job keeps the counts it
//! reached.

use anyhow::{Context, Result};
use dashmap::DashMap;
use std::{
	fmt::{self, Display},
	path::PathBuf,
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
};
use tileharvest_core::{CancellationSignal, HarvestError, HarvestRequest, JobId, ProgressState};
use tileharvest_pipeline::{HarvestOutcome, Harvester};
use tokio::{sync::Semaphore, task::JoinHandle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
	Queued,
	Running,
	Completed,
	Failed,
	Aborted,
}

impl JobState {
	pub fn is_terminal(self) -> bool {
		matches!(self, JobState::Completed | JobState::Failed | JobState::Aborted)
	}
}

impl Display for JobState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			JobState::Queued => "queued",
			JobState::Running => "running",
			JobState::Completed => "completed",
			JobState::Failed => "failed",
			JobState::Aborted => "aborted",
		})
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobStatus {
	pub state: JobState,
	pub total_tiles: u64,
	pub processed_tiles: u64,
	pub error: Option<HarvestError>,
}

impl JobStatus {
	fn queued() -> JobStatus {
		JobStatus {
			state: JobState::Queued,
			total_tiles: 0,
			processed_tiles: 0,
			error: None,
		}
	}
}

struct JobEntry {
	status: JobStatus,
	cancel: CancellationSignal,
}

/// A submitted job; await [`JobHandle::join`] for its terminal status.
pub struct JobHandle {
	pub id: JobId,
	task: JoinHandle<JobStatus>,
}

impl JobHandle {
	pub async fn join(self) -> Result<JobStatus> {
		self.task.await.with_context(|| format!("job {} panicked", self.id))
	}
}

#[derive(Clone)]
pub struct JobQueue {
	harvester: Arc<Harvester>,
	permits: Arc<Semaphore>,
	jobs: Arc<DashMap<JobId, JobEntry>>,
	next_id: Arc<AtomicU64>,
}

impl JobQueue {
	pub fn new(harvester: Harvester, workers: usize) -> JobQueue {
		log::debug!("job queue with {workers} workers");
		JobQueue {
			harvester: Arc::new(harvester),
			permits: Arc::new(Semaphore::new(workers.max(1))),
			jobs: Arc::new(DashMap::new()),
			next_id: Arc::new(AtomicU64::new(1)),
		}
	}

	/// Queues a harvest of `request` into `output`. Must be called within a tokio runtime.
	pub fn submit(&self, request: HarvestRequest, output: PathBuf) -> JobHandle {
		let id = self.next_id.fetch_add(1, Ordering::SeqCst);
		let cancel = CancellationSignal::new();
		self.jobs.insert(
			id,
			JobEntry {
				status: JobStatus::queued(),
				cancel: cancel.clone(),
			},
		);
		log::info!("job {id}: queued, output '{}'", output.display());

		let queue = self.clone();
		let task = tokio::spawn(async move { queue.execute(id, request, output, cancel).await });
		JobHandle { id, task }
	}

	async fn execute(&self, id: JobId, request: HarvestRequest, output: PathBuf, cancel: CancellationSignal) -> JobStatus {
		let _permit = match self.permits.acquire().await {
			Ok(permit) => permit,
			Err(e) => {
				let error = HarvestError::Internal(format!("job pool is closed: {e}"));
				return self.finish(id, JobState::Failed, 0, 0, Some(error));
			}
		};
		if cancel.is_cancelled() {
			log::info!("job {id}: cancelled while queued");
			return self.finish(id, JobState::Aborted, 0, 0, None);
		}
		self.set_state(id, JobState::Running);

		// final counts are recorded before the progress entry goes away
		let result = self.harvester.run_keeping_progress(id, &request, &output, &cancel).await;
		let status = match result {
			Ok(HarvestOutcome::Completed(s)) => self.finish(id, JobState::Completed, s.total_tiles, s.processed_tiles, None),
			Ok(HarvestOutcome::Aborted(s)) => self.finish(id, JobState::Aborted, s.total_tiles, s.processed_tiles, None),
			Err(e) => {
				let (total, processed) = self
					.progress(id)
					.map_or((0, 0), |p| (p.total_tiles, p.processed_tiles));
				self.finish(id, JobState::Failed, total, processed, Some(e))
			}
		};
		self.harvester.progress().clear(id);
		status
	}

	fn set_state(&self, id: JobId, state: JobState) {
		if let Some(mut entry) = self.jobs.get_mut(&id) {
			entry.status.state = state;
		}
	}

	fn finish(&self, id: JobId, state: JobState, total_tiles: u64, processed_tiles: u64, error: Option<HarvestError>) -> JobStatus {
		let status = JobStatus {
			state,
			total_tiles,
			processed_tiles,
			error,
		};
		if let Some(mut entry) = self.jobs.get_mut(&id) {
			entry.status = status.clone();
		}
		status
	}

	/// Current status of a job, `None` if the id was never issued.
	pub fn status(&self, id: JobId) -> Option<JobStatus> {
		let mut status = self.jobs.get(&id)?.status.clone();
		if status.state == JobState::Running {
			match self.progress(id) {
				Some(progress) => {
					status.total_tiles = progress.total_tiles;
					status.processed_tiles = progress.processed_tiles;
				}
				// either not counted yet, or finished since the entry was read
				None => status = self.jobs.get(&id)?.status.clone(),
			}
		}
		Some(status)
	}

	/// Live counters of a running job; `None` once the job is terminal or not yet counted.
	pub fn progress(&self, id: JobId) -> Option<ProgressState> {
		self.harvester.progress().get(id)
	}

	/// Asks a job to stop. Returns `false` for unknown or already finished jobs.
	pub fn cancel(&self, id: JobId) -> bool {
		match self.jobs.get(&id) {
			Some(entry) if !entry.status.state.is_terminal() => {
				log::info!("job {id}: cancellation requested");
				entry.cancel.cancel();
				true
			}
			_ => false,
		}
	}
}

impl fmt::Debug for JobQueue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("JobQueue")
			.field("jobs", &self.jobs.len())
			.field("available_workers", &self.permits.available_permits())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_fs::TempDir;
	use pretty_assertions::assert_eq;
	use async_trait::async_trait;
	use image::DynamicImage;
	use tileharvest_core::{
		BoundingExtent, ErrorCategory, LayerCapabilities, MapService, ProgressRegistry, Srs, TileCoord, TileMatrixLimits,
	};
	use tileharvest_pipeline::{
		HarvestOptions, MockClient, ResolvedSource, SourceRegistry, TileSourceStrategy,
		wmts::fixtures::{CapabilitiesBuilder, fake_wmts},
	};

	const URL: &str = "http://geo/wmts";

	fn queue(client: MockClient, workers: usize) -> JobQueue {
		let harvester = Harvester::new(
			Arc::new(SourceRegistry::with_defaults(Arc::new(client))),
			ProgressRegistry::new(),
			HarvestOptions::default(),
		);
		JobQueue::new(harvester, workers)
	}

	fn request(max_zoom: u8) -> HarvestRequest {
		HarvestRequest {
			services: vec![MapService::new(URL, &["ortho"], "WMTS")],
			extent: BoundingExtent::new(-170.0, -80.0, 170.0, 80.0, Srs::wgs84()).unwrap(),
			min_zoom: 0,
			max_zoom,
		}
	}

	fn client() -> MockClient {
		let xml = CapabilitiesBuilder::new().layer("ortho", None).full_levels(0..=2).build();
		fake_wmts(URL, &xml, &[("ortho", [10, 20, 30, 255])])
	}

	#[tokio::test]
	async fn completed_job_keeps_final_counts() -> Result<()> {
		let dir = TempDir::new()?;
		let queue = queue(client(), 2);
		let job = queue.submit(request(2), dir.path().join("a.mbtiles"));
		let id = job.id;
		let status = job.join().await?;

		assert_eq!(
			status,
			JobStatus {
				state: JobState::Completed,
				total_tiles: 21,
				processed_tiles: 21,
				error: None
			}
		);
		assert_eq!(queue.status(id), Some(status));
		assert!(queue.progress(id).is_none());
		assert!(!queue.cancel(id));
		Ok(())
	}

	#[tokio::test]
	async fn failed_job_reports_category() -> Result<()> {
		let dir = TempDir::new()?;
		let queue = queue(MockClient::new(), 1);
		let status = queue.submit(request(1), dir.path().join("b.mbtiles")).join().await?;
		assert_eq!(status.state, JobState::Failed);
		assert_eq!(status.error.map(|e| e.category()), Some(ErrorCategory::InvalidRequest));
		Ok(())
	}

	#[tokio::test]
	async fn job_cancelled_while_queued_never_runs() -> Result<()> {
		let dir = TempDir::new()?;
		let client = client();
		let queue = queue(client.clone(), 1);
		// the current-thread runtime does not start the task before the first await
		let job = queue.submit(request(2), dir.path().join("c.mbtiles"));
		assert_eq!(queue.status(job.id).map(|s| s.state), Some(JobState::Queued));
		assert!(queue.cancel(job.id));

		let status = job.join().await?;
		assert_eq!(status.state, JobState::Aborted);
		assert_eq!(status.processed_tiles, 0);
		assert!(client.requests().is_empty());
		assert!(!dir.path().join("c.mbtiles").exists());
		Ok(())
	}

	#[tokio::test]
	async fn jobs_get_distinct_ids() -> Result<()> {
		let dir = TempDir::new()?;
		let queue = queue(client(), 1);
		let a = queue.submit(request(0), dir.path().join("d.mbtiles"));
		let b = queue.submit(request(0), dir.path().join("e.mbtiles"));
		assert_ne!(a.id, b.id);
		assert_eq!(a.join().await?.state, JobState::Completed);
		assert_eq!(b.join().await?.state, JobState::Completed);
		assert_eq!(queue.status(999), None);
		Ok(())
	}

	/// Serves `good` blank tiles, then tiles without pixels, which no store can encode.
	#[derive(Debug)]
	struct BreakingSource {
		good: u64,
		fetched: AtomicU64,
		layers: Vec<LayerCapabilities>,
	}

	#[async_trait]
	impl ResolvedSource for BreakingSource {
		fn layers(&self) -> &[LayerCapabilities] {
			&self.layers
		}

		async fn fetch_tile(&self, _layer: &str, _coord: &TileCoord) -> Option<DynamicImage> {
			if self.fetched.fetch_add(1, Ordering::SeqCst) < self.good {
				Some(DynamicImage::new_rgba8(256, 256))
			} else {
				Some(DynamicImage::new_rgba8(0, 0))
			}
		}

		async fn fetch_tile_size(&self, _layer: &str, _coord: &TileCoord) -> Option<u64> {
			None
		}
	}

	#[derive(Debug)]
	struct Breaking(u64);

	#[async_trait]
	impl TileSourceStrategy for Breaking {
		fn service_type(&self) -> &str {
			"BREAKING"
		}

		async fn open(&self, service: &MapService, _matrix_set: &str) -> Result<Box<dyn ResolvedSource>> {
			let limits = (0..=2u8)
				.map(|z| {
					let max = (1u32 << z) - 1;
					TileMatrixLimits::new(&format!("EPSG:3857:{z}"), 0, max, 0, max)
				})
				.collect::<Result<Vec<_>>>()?;
			Ok(Box::new(BreakingSource {
				good: self.0,
				fetched: AtomicU64::new(0),
				layers: vec![LayerCapabilities {
					identifier: service.layers[0].clone(),
					limits,
					geographic_extent: BoundingExtent::world_wgs84(),
				}],
			}))
		}
	}

	#[tokio::test]
	async fn failed_job_keeps_counts_reached() -> Result<()> {
		let dir = TempDir::new()?;
		let mut registry = SourceRegistry::new_empty();
		registry.register(Box::new(Breaking(7)));
		let harvester = Harvester::new(
			Arc::new(registry),
			ProgressRegistry::new(),
			HarvestOptions {
				fetch_concurrency: 1,
				..HarvestOptions::default()
			},
		);
		let queue = JobQueue::new(harvester, 1);
		let mut req = request(2);
		req.services[0].service_type = String::from("BREAKING");

		let job = queue.submit(req, dir.path().join("f.mbtiles"));
		let id = job.id;
		let status = job.join().await?;
		assert_eq!(status.state, JobState::Failed);
		assert_eq!(status.error.as_ref().map(|e| e.category()), Some(ErrorCategory::StoreIo));
		assert_eq!((status.total_tiles, status.processed_tiles), (21, 7));
		assert_eq!(queue.status(id), Some(status));
		assert!(queue.progress(id).is_none());
		Ok(())
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn observed_counts_never_drop() -> Result<()> {
		let dir = TempDir::new()?;
		let queue = queue(client(), 1);
		let job = queue.submit(request(2), dir.path().join("g.mbtiles"));
		let id = job.id;

		let watcher = queue.clone();
		let observed = tokio::spawn(async move {
			let mut seen = Vec::new();
			loop {
				let Some(status) = watcher.status(id) else {
					return seen;
				};
				seen.push(status.processed_tiles);
				if status.state.is_terminal() {
					return seen;
				}
				tokio::task::yield_now().await;
			}
		})
		.await?;
		let status = job.join().await?;

		assert!(observed.windows(2).all(|w| w[0] <= w[1]), "{observed:?}");
		assert_eq!(observed.last(), Some(&21));
		assert_eq!(status.processed_tiles, 21);
		Ok(())
	}

	#[cfg(feature = "proj")]
	#[tokio::test]
	async fn utm_extent_is_harvested() -> Result<()> {
		let dir = TempDir::new()?;
		let xml = CapabilitiesBuilder::new().layer("ortho", None).full_levels(10..=10).build();
		let queue = queue(fake_wmts(URL, &xml, &[("ortho", [10, 20, 30, 255])]), 1);
		let request = HarvestRequest {
			services: vec![MapService::new(URL, &["ortho"], "WMTS")],
			extent: BoundingExtent::new(420_000.0, 4_570_000.0, 440_000.0, 4_590_000.0, Srs::new("EPSG:25831")?)?,
			min_zoom: 10,
			max_zoom: 10,
		};
		let status = queue.submit(request, dir.path().join("utm.mbtiles")).join().await?;
		assert_eq!(status.state, JobState::Completed);
		// columns 517 and 518 of row 382
		assert_eq!((status.total_tiles, status.processed_tiles), (2, 2));
		Ok(())
	}
}
