//! Per-file ingestion: detect the tile, check the format, decode bundles and write the tiles.
//!
//! Each discovered file ends in one of three states:
//! - stored: its tile (or every tile of its bundle) was written,
//! - skipped: its path does not follow the addressing pattern, the run continues,
//! - aborted: a format or bundle validation failed, the error ends the run.

use crate::{IngestConfig, PoolStats, ShardHandle, WriterPool};
use anyhow::{Context, Result};
use std::{
	fmt::{self, Display},
	path::Path,
};
use time::OffsetDateTime;
use tileshard_core::{
	Blob, DetectedTile, IngestError, ShardAddress, ShardKey, SourceFormat, TileCoord, TileRecord, decode_metatile,
	detect_tile,
};

/// Extension of metatile bundle files.
pub const METATILE_EXTENSION: &str = "meta";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileOutcome {
	Skipped,
	Stored { tiles: usize },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
	pub files_processed: u64,
	pub files_skipped: u64,
	pub tiles_stored: u64,
	pub pool: PoolStats,
}

impl Display for IngestStats {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"files processed: {}, skipped: {}, tiles stored: {}, {}",
			self.files_processed, self.files_skipped, self.tiles_stored, self.pool
		)
	}
}

pub struct TileIngester {
	config: IngestConfig,
	pool: WriterPool,
	stats: IngestStats,
}

impl TileIngester {
	pub fn new(config: IngestConfig) -> Result<TileIngester> {
		log::debug!("ingest {} tiles into {:?}", config.format, config.output_dir);
		let pool = WriterPool::new(config.pool.clone())?;
		Ok(TileIngester {
			config,
			pool,
			stats: IngestStats::default(),
		})
	}

	/// Ingests one source file.
	///
	/// Paths that do not match the addressing pattern are logged and skipped; format mismatches,
	/// corrupt bundles and store faults are returned as errors.
	pub fn ingest_file(&mut self, path: &Path) -> Result<FileOutcome> {
		let tile = match detect_tile(self.config.format, path) {
			Ok(tile) => tile,
			Err(err) if err.is_recoverable() => {
				log::warn!("{err}");
				self.stats.files_skipped += 1;
				return Ok(FileOutcome::Skipped);
			}
			Err(err) => return Err(err.into()),
		};

		self.check_format(path, &tile)?;

		log::debug!("process {path:?}");
		let blob = Blob::read_file(path).with_context(|| format!("reading {path:?}"))?;
		let tiles = self
			.ingest_blob(&tile.coord, blob)
			.with_context(|| format!("ingesting {path:?} as {}", self.config.format))?;
		self.stats.files_processed += 1;
		Ok(FileOutcome::Stored { tiles })
	}

	fn check_format(&self, path: &Path, tile: &DetectedTile) -> Result<(), IngestError> {
		let format = self.config.format;
		let is_bundle_file = tile.extension == METATILE_EXTENSION;
		if format.is_bundle() == is_bundle_file {
			return Ok(());
		}
		Err(IngestError::FormatMismatch {
			path: path.to_path_buf(),
			format,
			hint: match (format, is_bundle_file) {
				(SourceFormat::Tms, true) => None,
				(_, true) => Some(SourceFormat::Meta),
				(_, false) => Some(SourceFormat::Htms),
			},
		})
	}

	/// Stores the payload found at `coord`: a single tile, or every tile of a bundle.
	///
	/// Bundle tiles are written into the shard of the bundle's own coordinate.
	pub fn ingest_blob(&mut self, coord: &TileCoord, blob: Blob) -> Result<usize> {
		let timestamp = OffsetDateTime::now_utc().unix_timestamp();
		let version = self.config.version;

		let records: Vec<TileRecord> = if self.config.format.is_bundle() {
			decode_metatile(coord, &blob)?
				.into_iter()
				.map(|entry| TileRecord::new(entry.coord, entry.blob, timestamp).with_version(version))
				.collect()
		} else {
			vec![TileRecord::new(*coord, blob, timestamp).with_version(version)]
		};

		let handle = self.acquire(coord)?;
		for record in &records {
			self.pool.upsert(handle, record)?;
			self.stats.tiles_stored += 1;
		}
		Ok(records.len())
	}

	fn acquire(&mut self, coord: &TileCoord) -> Result<ShardHandle> {
		let key = ShardKey::from_coord(coord);
		let address = ShardAddress::resolve(&self.config.output_dir, coord, &self.config.extension);
		self.pool.acquire(key, &address)
	}

	/// Commits and closes all shards and returns the run's statistics.
	pub fn finish(mut self) -> Result<IngestStats> {
		log::info!("finalize");
		self.pool.flush_all()?;
		self.pool.close_all()?;
		self.stats.pool = self.pool.stats().clone();
		Ok(self.stats)
	}
}
