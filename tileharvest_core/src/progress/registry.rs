//! Process-wide map from job id to progress counters.
//!
//! Writers are the harvests, one per job; readers are status queries from any thread.
//! For every entry `processed_tiles <= total_tiles` holds and `processed_tiles` never
//! decreases. An entry disappears once its job reaches a terminal state, after which
//! queries report the job as unknown.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;

pub type JobId = u64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProgressState {
	pub total_tiles: u64,
	pub processed_tiles: u64,
}

impl ProgressState {
	/// Fraction done in `[0, 1]`; an empty job counts as done.
	pub fn fraction(&self) -> f64 {
		if self.total_tiles == 0 {
			1.0
		} else {
			self.processed_tiles as f64 / self.total_tiles as f64
		}
	}
}

/// Cheaply cloneable handle; all clones share one map.
#[derive(Clone, Debug, Default)]
pub struct ProgressRegistry {
	entries: Arc<DashMap<JobId, ProgressState>>,
}

impl ProgressRegistry {
	pub fn new() -> ProgressRegistry {
		ProgressRegistry::default()
	}

	/// Publishes `{total_tiles, 0}` for a job, replacing a previous entry.
	pub fn start(&self, job_id: JobId, total_tiles: u64) {
		log::debug!("job {job_id}: tracking progress of {total_tiles} tiles");
		self.entries.insert(
			job_id,
			ProgressState {
				total_tiles,
				processed_tiles: 0,
			},
		);
	}

	/// Records `processed_tiles` for a job. Values are clamped to the total and never move
	/// the counter backwards; updates for unknown jobs are ignored.
	pub fn update(&self, job_id: JobId, processed_tiles: u64) {
		if let Some(mut entry) = self.entries.get_mut(&job_id) {
			let clamped = processed_tiles.min(entry.total_tiles);
			if clamped > entry.processed_tiles {
				entry.processed_tiles = clamped;
			}
		}
	}

	pub fn get(&self, job_id: JobId) -> Option<ProgressState> {
		self.entries.get(&job_id).map(|e| *e)
	}

	/// Removes a job's entry and returns its last state.
	pub fn clear(&self, job_id: JobId) -> Option<ProgressState> {
		self.entries.remove(&job_id).map(|(_, state)| state)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
