//! Read access to a shard file, used to verify what ingestion wrote.

use super::has_schema;
use anyhow::{Context, Result, ensure};
use r2d2_sqlite::rusqlite::{Connection, OpenFlags, OptionalExtension, Row, params};
use std::{
	fmt::{self, Display},
	path::{Path, PathBuf},
};
use tileshard_core::Blob;

/// A row of the tile table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredTile {
	pub x: u32,
	pub y: u32,
	pub version: u32,
	pub content_type: Option<String>,
	pub size: u64,
	pub hash: u32,
	pub timestamp: i64,
	pub blob: Blob,
}

impl StoredTile {
	fn from_row(row: &Row) -> r2d2_sqlite::rusqlite::Result<StoredTile> {
		Ok(StoredTile {
			x: row.get(0)?,
			y: row.get(1)?,
			version: row.get(2)?,
			content_type: row.get(3)?,
			size: row.get::<_, i64>(4)? as u64,
			hash: row.get::<_, i64>(5)? as u32,
			timestamp: row.get(6)?,
			blob: Blob::from(row.get::<_, Vec<u8>>(7)?),
		})
	}

	/// Whether the stored size and checksum describe the stored payload.
	pub fn is_consistent(&self) -> bool {
		self.size == self.blob.len() && self.hash == self.blob.crc32()
	}
}

/// Totals over all rows of a shard.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShardSummary {
	pub tiles: u64,
	pub bytes: u64,
	pub versions: Vec<u32>,
	/// `(x, y, version)` of rows whose size or checksum disagree with the payload.
	pub inconsistent: Vec<(u32, u32, u32)>,
}

impl Display for ShardSummary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"tiles: {}, bytes: {}, versions: {:?}, inconsistent: {}",
			self.tiles,
			self.bytes,
			self.versions,
			self.inconsistent.len()
		)
	}
}

pub struct ShardReader {
	path: PathBuf,
	connection: Connection,
}

const SELECT_COLUMNS: &str = "SELECT x, y, v, c, s, h, d, b FROM t";

impl ShardReader {
	pub fn open(path: &Path) -> Result<ShardReader> {
		log::debug!("open shard {path:?} for reading");
		ensure!(path.is_file(), "shard {path:?} does not exist");
		let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
			.with_context(|| format!("opening shard {path:?}"))?;
		ensure!(has_schema(&connection)?, "{path:?} has no tile table");
		Ok(ShardReader {
			path: path.to_path_buf(),
			connection,
		})
	}

	pub fn count(&self) -> Result<u64> {
		let count: i64 = self
			.connection
			.query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
			.with_context(|| format!("counting tiles in {:?}", self.path))?;
		Ok(count as u64)
	}

	pub fn get_tile(&self, x: u32, y: u32, version: u32) -> Result<Option<StoredTile>> {
		self.connection
			.query_row(
				&format!("{SELECT_COLUMNS} WHERE x = ?1 AND y = ?2 AND v = ?3"),
				params![x, y, version],
				StoredTile::from_row,
			)
			.optional()
			.with_context(|| format!("reading tile ({x}, {y}, {version}) from {:?}", self.path))
	}

	/// All rows ordered by `(x, y, version)`.
	pub fn tiles(&self) -> Result<Vec<StoredTile>> {
		let mut statement = self.connection.prepare(&format!("{SELECT_COLUMNS} ORDER BY x, y, v"))?;
		let tiles = statement
			.query_map([], StoredTile::from_row)?
			.collect::<Result<Vec<_>, _>>()
			.with_context(|| format!("reading tiles from {:?}", self.path))?;
		Ok(tiles)
	}

	/// Scans every row and recomputes its checksum.
	pub fn probe(&self) -> Result<ShardSummary> {
		let mut summary = ShardSummary::default();
		for tile in self.tiles()? {
			summary.tiles += 1;
			summary.bytes += tile.blob.len();
			if !summary.versions.contains(&tile.version) {
				summary.versions.push(tile.version);
			}
			if !tile.is_consistent() {
				log::warn!(
					"tile ({}, {}, {}) in {:?}: stored size={} crc32={}, actual size={} crc32={}",
					tile.x,
					tile.y,
					tile.version,
					self.path,
					tile.size,
					tile.hash,
					tile.blob.len(),
					tile.blob.crc32()
				);
				summary.inconsistent.push((tile.x, tile.y, tile.version));
			}
		}
		summary.versions.sort_unstable();
		Ok(summary)
	}
}
