//! Read, insert, merge and finalize tiles in an MBTiles (SQLite) file.
//!
//! The schema follows the [MBTiles 1.3 specification](https://github.com/mapbox/mbtiles-spec):
//! - `metadata` holds key/value pairs describing the tile set
//! - `tiles` holds `(zoom_level, tile_column, tile_row, tile_data)`
//!
//! Rows are addressed in the **TMS layout** (`tile_row = 2^z - 1 - y`); callers holding
//! source coordinates convert with [`TileCoord::tms_row`]. Every tile is stored as PNG.
//!
//! A store has one writer. [`MBTilesStore::put_tile`] merges a new tile over whatever is
//! already stored at the coordinate, so several layers can be harvested into one file in
//! bottom-to-top order.
//!
//! ## Example
//! ```rust,no_run
//! use tileharvest_container::MBTilesStore;
//! use std::path::Path;
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let store = MBTilesStore::create(Path::new("/tmp/harvest.mbtiles"))?;
//!     assert_eq!(store.tile_count()?, 0);
//!     store.close()
//! }
//! ```

use super::TileSetMetadata;
use anyhow::{Context, Result, ensure};
use image::DynamicImage;
use r2d2::Pool;
use r2d2_sqlite::{
	SqliteConnectionManager,
	rusqlite::{OptionalExtension, params},
};
use std::{
	collections::BTreeMap,
	fmt::{self, Debug},
	path::{Path, PathBuf},
};
use tileharvest_core::{Blob, TileCoord};
use tileharvest_image::{blob2image, composite, image2blob};

/// What [`MBTilesStore::put_tile`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PutOutcome {
	Inserted,
	Updated,
}

pub struct MBTilesStore {
	path: PathBuf,
	pool: Pool<SqliteConnectionManager>,
}

impl MBTilesStore {
	/// Opens `path` for writing, creating the file and schema if needed.
	///
	/// An existing empty file (as left by a scheduler that reserves the output path) is
	/// accepted; an existing store keeps its tiles.
	pub fn create(path: &Path) -> Result<MBTilesStore> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			ensure!(parent.is_dir(), "directory '{}' does not exist", parent.display());
		}
		let store = Self::connect(path).with_context(|| format!("creating MBTiles store '{}'", path.display()))?;
		store
			.pool
			.get()?
			.execute_batch(
				"CREATE TABLE IF NOT EXISTS metadata (name TEXT, value TEXT, UNIQUE (name));
				CREATE TABLE IF NOT EXISTS tiles (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_data BLOB, UNIQUE (zoom_level, tile_column, tile_row));
				CREATE UNIQUE INDEX IF NOT EXISTS tile_index on tiles (zoom_level, tile_column, tile_row);",
			)
			.with_context(|| format!("creating MBTiles schema in '{}'", path.display()))?;
		log::debug!("opened MBTiles store '{}'", path.display());
		Ok(store)
	}

	/// Opens an existing store, e.g. to inspect a finished harvest.
	pub fn open(path: &Path) -> Result<MBTilesStore> {
		ensure!(path.exists(), "file '{}' does not exist", path.display());
		Self::connect(path).with_context(|| format!("opening MBTiles store '{}'", path.display()))
	}

	fn connect(path: &Path) -> Result<MBTilesStore> {
		let manager = SqliteConnectionManager::file(path);
		let pool = Pool::builder().max_size(1).build(manager)?;
		Ok(MBTilesStore {
			path: path.to_path_buf(),
			pool,
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Reads the stored bytes at `(level, column, tms_row)`.
	pub fn read_tile(&self, level: u8, column: u32, tms_row: u32) -> Result<Option<Blob>> {
		let conn = self.pool.get()?;
		let data = conn
			.query_row(
				"SELECT tile_data FROM tiles WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3",
				params![level, column, tms_row],
				|row| row.get::<_, Vec<u8>>(0),
			)
			.optional()
			.with_context(|| format!("reading tile {level}/{column}/{tms_row}"))?;
		Ok(data.map(Blob::from))
	}

	pub fn insert_tile(&self, level: u8, column: u32, tms_row: u32, data: &Blob) -> Result<()> {
		log::trace!("insert tile {level}/{column}/{tms_row} ({} bytes)", data.len());
		self.pool
			.get()?
			.execute(
				"INSERT INTO tiles (zoom_level, tile_column, tile_row, tile_data) VALUES (?1, ?2, ?3, ?4)",
				params![level, column, tms_row, data.as_slice()],
			)
			.with_context(|| format!("inserting tile {level}/{column}/{tms_row}"))?;
		Ok(())
	}

	pub fn update_tile(&self, level: u8, column: u32, tms_row: u32, data: &Blob) -> Result<()> {
		let updated = self
			.pool
			.get()?
			.execute(
				"UPDATE tiles SET tile_data = ?1 WHERE zoom_level = ?2 AND tile_column = ?3 AND tile_row = ?4",
				params![data.as_slice(), level, column, tms_row],
			)
			.with_context(|| format!("updating tile {level}/{column}/{tms_row}"))?;
		log::trace!("updated {updated} tile(s) at {level}/{column}/{tms_row}");
		ensure!(updated == 1, "no tile to update at {level}/{column}/{tms_row}");
		Ok(())
	}

	/// Writes `image` at `coord` (source row numbering).
	///
	/// Without a stored tile the image is inserted. Otherwise it is composited over the stored
	/// tile and the result replaces it. A stored tile that cannot be decoded is replaced.
	pub fn put_tile(&self, coord: &TileCoord, image: DynamicImage) -> Result<PutOutcome> {
		let (level, column, row) = (coord.level, coord.x, coord.tms_row());
		match self.read_tile(level, column, row)? {
			None => {
				self.insert_tile(level, column, row, &image2blob(&image)?)?;
				Ok(PutOutcome::Inserted)
			}
			Some(existing) => {
				let below = match blob2image(&existing) {
					Ok(below) => Some(below),
					Err(e) => {
						log::warn!("stored tile {level}/{column}/{row} is unreadable, replacing it: {e}");
						None
					}
				};
				let merged = composite(below, Some(image)).context("compositing produced no image")?;
				self.update_tile(level, column, row, &image2blob(&merged)?)?;
				Ok(PutOutcome::Updated)
			}
		}
	}

	/// Writes the complete metadata block in one transaction.
	pub fn write_metadata(&self, metadata: &TileSetMetadata) -> Result<()> {
		let mut conn = self.pool.get()?;
		let transaction = conn.transaction()?;
		for (name, value) in metadata.entries() {
			transaction.execute(
				"INSERT OR REPLACE INTO metadata (name, value) VALUES (?1, ?2)",
				params![name, value],
			)?;
		}
		transaction.commit().context("writing metadata")?;
		log::debug!("wrote metadata of '{}' to '{}'", metadata.name, self.path.display());
		Ok(())
	}

	pub fn metadata(&self) -> Result<BTreeMap<String, String>> {
		let conn = self.pool.get()?;
		let mut stmt = conn.prepare("SELECT name, value FROM metadata")?;
		let entries = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
		let mut map = BTreeMap::new();
		for entry in entries {
			let (name, value) = entry?;
			map.insert(name, value);
		}
		Ok(map)
	}

	pub fn has_metadata(&self) -> Result<bool> {
		Ok(!self.metadata()?.is_empty())
	}

	pub fn tile_count(&self) -> Result<u64> {
		let count = self
			.pool
			.get()?
			.query_row("SELECT COUNT(*) FROM tiles", [], |row| row.get::<_, i64>(0))?;
		Ok(u64::try_from(count)?)
	}

	/// Closes the store. The handle is consumed, so no further writes are possible.
	pub fn close(self) -> Result<()> {
		self.pool
			.get()?
			.execute_batch("PRAGMA optimize;")
			.with_context(|| format!("closing '{}'", self.path.display()))?;
		log::debug!("closed MBTiles store '{}'", self.path.display());
		Ok(())
	}
}

impl Debug for MBTilesStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MBTilesStore").field("path", &self.path).finish()
	}
}
