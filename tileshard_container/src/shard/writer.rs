//! An open shard file.
//!
//! Writes are grouped into a transaction that is opened by the first upsert after a commit and
//! closed by the next [`ShardWriter::commit`]. Dropping a writer without committing discards the
//! pending writes.

use super::ensure_schema;
use anyhow::{Context, Result};
use r2d2_sqlite::rusqlite::{Connection, params};
use std::{
	fs,
	path::{Path, PathBuf},
};
use tileshard_core::{ShardAddress, ShardKey, TileRecord};

pub struct ShardWriter {
	key: ShardKey,
	path: PathBuf,
	connection: Connection,
	pending: u64,
}

impl ShardWriter {
	/// Opens (or creates) the shard file at `address`, creating its directory and tile table as needed.
	pub fn open(key: ShardKey, address: &ShardAddress) -> Result<ShardWriter> {
		log::debug!("open shard {key} at {:?}", address.file);
		fs::create_dir_all(&address.dir).with_context(|| format!("creating directory {:?}", address.dir))?;
		let connection =
			Connection::open(&address.file).with_context(|| format!("opening shard {:?}", address.file))?;
		if ensure_schema(&connection).with_context(|| format!("preparing shard {:?}", address.file))? {
			log::trace!("created tile table in {:?}", address.file);
		}
		Ok(ShardWriter {
			key,
			path: address.file.clone(),
			connection,
			pending: 0,
		})
	}

	pub fn key(&self) -> ShardKey {
		self.key
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Number of upserts since the last commit.
	pub fn pending(&self) -> u64 {
		self.pending
	}

	/// Inserts `record`, replacing any row with the same `(x, y, version)`.
	pub fn upsert(&mut self, record: &TileRecord) -> Result<()> {
		if self.connection.is_autocommit() {
			self.connection.execute_batch("BEGIN")?;
		}
		self.connection
			.execute(
				"INSERT OR REPLACE INTO t (x, y, v, c, s, h, d, b) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
				params![
					record.coord.x,
					record.coord.y,
					record.version,
					record.content_type,
					record.size() as i64,
					i64::from(record.hash()),
					record.timestamp,
					record.blob.as_slice(),
				],
			)
			.with_context(|| format!("writing tile {} into {:?}", record.coord, self.path))?;
		self.pending += 1;
		Ok(())
	}

	/// Commits pending writes. Returns `false` if there was nothing to commit.
	pub fn commit(&mut self) -> Result<bool> {
		if self.connection.is_autocommit() {
			return Ok(false);
		}
		log::trace!("commit {} tiles into shard {}", self.pending, self.key);
		self.connection
			.execute_batch("COMMIT")
			.with_context(|| format!("committing shard {:?}", self.path))?;
		self.pending = 0;
		Ok(true)
	}

	/// Commits pending writes and closes the file.
	pub fn close(mut self) -> Result<()> {
		self.commit()?;
		log::debug!("close shard {}", self.key);
		let path = self.path;
		self.connection
			.close()
			.map_err(|(_, err)| err)
			.with_context(|| format!("closing shard {path:?}"))
	}
}
