//! A bounded set of open shard writers.
//!
//! Writers are created lazily by [`WriterPool::acquire`] and evicted in creation order (FIFO, not
//! least recently used) once `max_writers` are open. Evicting a writer commits and closes it and
//! removes its key, so a later `acquire` of the same shard reopens the file.
//!
//! The pool also owns the insertion counter: with `max_inserts > 0` every open writer is
//! committed after that many upserts.

use super::ShardWriter;
use crate::PoolConfig;
use anyhow::{Result, ensure};
use std::{
	collections::{HashMap, VecDeque},
	fmt::{self, Display},
};
use tileshard_core::{IngestError, ShardAddress, ShardKey, TileRecord};

/// Refers to a writer inside a [`WriterPool`]. It goes stale when the writer is evicted.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ShardHandle(ShardKey);

impl ShardHandle {
	pub fn key(&self) -> ShardKey {
		self.0
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
	pub opened: u64,
	pub evicted: u64,
	pub flushes: u64,
	pub inserts: u64,
}

impl Display for PoolStats {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"shards opened: {}, evicted: {}, flushes: {}, inserts: {}",
			self.opened, self.evicted, self.flushes, self.inserts
		)
	}
}

pub struct WriterPool {
	config: PoolConfig,
	writers: HashMap<ShardKey, ShardWriter>,
	order: VecDeque<ShardKey>,
	inserts_since_flush: u64,
	stats: PoolStats,
}

impl WriterPool {
	pub fn new(config: PoolConfig) -> Result<WriterPool> {
		ensure!(config.max_writers > 0, "max_writers must be at least 1");
		Ok(WriterPool {
			writers: HashMap::with_capacity(config.max_writers),
			order: VecDeque::with_capacity(config.max_writers),
			config,
			inserts_since_flush: 0,
			stats: PoolStats::default(),
		})
	}

	/// Returns the handle of the open writer for `key`, opening the shard at `address` if needed.
	///
	/// If the pool is full, the oldest writer is committed and closed first.
	pub fn acquire(&mut self, key: ShardKey, address: &ShardAddress) -> Result<ShardHandle> {
		if self.writers.contains_key(&key) {
			return Ok(ShardHandle(key));
		}

		while self.order.len() >= self.config.max_writers {
			self.evict_oldest()?;
		}

		let writer = ShardWriter::open(key, address)?;
		self.writers.insert(key, writer);
		self.order.push_back(key);
		self.stats.opened += 1;
		Ok(ShardHandle(key))
	}

	fn evict_oldest(&mut self) -> Result<()> {
		let Some(key) = self.order.pop_front() else {
			return Ok(());
		};
		log::debug!("evict shard {key}");
		self.stats.evicted += 1;
		match self.writers.remove(&key) {
			Some(writer) => writer.close(),
			None => Ok(()),
		}
	}

	/// Writes `record` through the writer behind `handle`.
	///
	/// Fails with [`IngestError::StoreFault`] if the writer has been evicted or closed since the
	/// handle was acquired.
	pub fn upsert(&mut self, handle: ShardHandle, record: &TileRecord) -> Result<()> {
		let Some(writer) = self.writers.get_mut(&handle.0) else {
			let fault = IngestError::StoreFault {
				shard: handle.0.to_string(),
				coord: record.coord,
				size: record.size(),
				checksum: record.hash(),
				preview: record.blob.hex_preview(256),
			};
			log::error!("{fault}");
			return Err(fault.into());
		};
		writer.upsert(record)?;
		self.stats.inserts += 1;
		self.inserts_since_flush += 1;

		if self.config.max_inserts > 0 && self.inserts_since_flush >= self.config.max_inserts {
			self.flush_all()?;
			self.inserts_since_flush = 0;
		}
		Ok(())
	}

	/// Commits every open writer without closing it.
	pub fn flush_all(&mut self) -> Result<()> {
		log::trace!("flush {} shards", self.order.len());
		for key in &self.order {
			if let Some(writer) = self.writers.get_mut(key) {
				writer.commit()?;
			}
		}
		self.stats.flushes += 1;
		Ok(())
	}

	/// Commits and closes every open writer, leaving the pool empty.
	///
	/// Every writer is closed even if an earlier one fails; the first error is returned.
	pub fn close_all(&mut self) -> Result<()> {
		log::debug!("close {} shards", self.order.len());
		let mut result = Ok(());
		while let Some(key) = self.order.pop_front() {
			if let Some(writer) = self.writers.remove(&key) {
				let closed = writer.close();
				if result.is_ok() {
					result = closed;
				}
			}
		}
		self.inserts_since_flush = 0;
		result
	}

	pub fn len(&self) -> usize {
		self.writers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.writers.is_empty()
	}

	pub fn contains(&self, key: &ShardKey) -> bool {
		self.writers.contains_key(key)
	}

	/// Keys of the open writers, oldest first.
	pub fn keys(&self) -> impl Iterator<Item = &ShardKey> {
		self.order.iter()
	}

	pub fn stats(&self) -> &PoolStats {
		&self.stats
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ShardReader;
	use assert_fs::TempDir;
	use pretty_assertions::assert_eq;
	use std::path::Path;
	use tileshard_core::{Blob, TileCoord};

	fn pool(max_writers: usize, max_inserts: u64) -> WriterPool {
		WriterPool::new(PoolConfig {
			max_writers,
			max_inserts,
		})
		.unwrap()
	}

	fn acquire(pool: &mut WriterPool, root: &Path, coord: &TileCoord) -> ShardHandle {
		let address = ShardAddress::resolve(root, coord, "sqlitedb");
		pool.acquire(ShardKey::from_coord(coord), &address).unwrap()
	}

	fn record(coord: TileCoord, payload: &str) -> TileRecord {
		TileRecord::new(coord, Blob::from(payload), 1_700_000_000)
	}

	fn coord(level: u8, x: u32, y: u32) -> TileCoord {
		TileCoord::new(level, x, y).unwrap()
	}

	fn count(root: &Path, coord: &TileCoord) -> u64 {
		let address = ShardAddress::resolve(root, coord, "sqlitedb");
		ShardReader::open(&address.file).unwrap().count().unwrap()
	}

	#[test]
	fn rejects_zero_writers() {
		assert!(WriterPool::new(PoolConfig {
			max_writers: 0,
			max_inserts: 0
		})
		.is_err());
	}

	#[test]
	fn acquire_reuses_open_writer() {
		let dir = TempDir::new().unwrap();
		let mut pool = pool(4, 0);
		let a = acquire(&mut pool, dir.path(), &coord(3, 10, 20));
		let b = acquire(&mut pool, dir.path(), &coord(3, 1, 2));
		assert_eq!(a, b);
		assert_eq!(pool.len(), 1);
		assert_eq!(pool.stats().opened, 1);
	}

	#[test]
	fn never_exceeds_max_writers() {
		let dir = TempDir::new().unwrap();
		let mut pool = pool(3, 0);
		for i in 0..10u32 {
			acquire(&mut pool, dir.path(), &coord(12, i * 256, 0));
			assert!(pool.len() <= 3);
		}
		assert_eq!(pool.len(), 3);
		assert_eq!(pool.stats().opened, 10);
		assert_eq!(pool.stats().evicted, 7);
		let keys: Vec<String> = pool.keys().map(ToString::to_string).collect();
		assert_eq!(keys, vec!["12:7:0", "12:8:0", "12:9:0"]);
	}

	#[test]
	fn eviction_is_fifo_not_lru() {
		let dir = TempDir::new().unwrap();
		let mut pool = pool(2, 0);
		let first = coord(12, 0, 0);
		let second = coord(12, 256, 0);
		acquire(&mut pool, dir.path(), &first);
		acquire(&mut pool, dir.path(), &second);
		// reusing the oldest shard does not protect it
		acquire(&mut pool, dir.path(), &first);
		acquire(&mut pool, dir.path(), &coord(12, 512, 0));
		assert!(!pool.contains(&ShardKey::from_coord(&first)));
		assert!(pool.contains(&ShardKey::from_coord(&second)));
	}

	#[test]
	fn eviction_commits_before_closing() {
		let dir = TempDir::new().unwrap();
		let mut pool = pool(1, 0);
		let first = coord(12, 0, 0);
		let handle = acquire(&mut pool, dir.path(), &first);
		pool.upsert(handle, &record(first, "ABC")).unwrap();
		pool.upsert(handle, &record(coord(12, 1, 0), "DEF")).unwrap();

		acquire(&mut pool, dir.path(), &coord(12, 256, 0));
		assert_eq!(count(dir.path(), &first), 2);
	}

	#[test]
	fn evicted_shard_is_reopened() {
		let dir = TempDir::new().unwrap();
		let mut pool = pool(1, 0);
		let first = coord(12, 0, 0);
		let handle = acquire(&mut pool, dir.path(), &first);
		pool.upsert(handle, &record(first, "ABC")).unwrap();
		acquire(&mut pool, dir.path(), &coord(12, 256, 0));

		let handle = acquire(&mut pool, dir.path(), &first);
		pool.upsert(handle, &record(coord(12, 5, 5), "DEF")).unwrap();
		pool.close_all().unwrap();
		assert_eq!(count(dir.path(), &first), 2);
		assert_eq!(pool.stats().opened, 3);
	}

	#[test]
	fn stale_handle_is_a_store_fault() {
		let dir = TempDir::new().unwrap();
		let mut pool = pool(1, 0);
		let first = coord(3, 10, 20);
		let stale = acquire(&mut pool, dir.path(), &first);
		acquire(&mut pool, dir.path(), &coord(3, 300, 20));

		let err = pool.upsert(stale, &record(first, "ABC")).unwrap_err();
		match err.downcast_ref::<IngestError>() {
			Some(IngestError::StoreFault {
				shard,
				coord,
				size,
				checksum,
				preview,
			}) => {
				assert_eq!(shard, "3:0:0");
				assert_eq!(*coord, first);
				assert_eq!(*size, 3);
				assert_eq!(*checksum, 0xa383_0348);
				assert_eq!(preview, "414243");
			}
			_ => panic!("unexpected error: {err}"),
		}
	}

	#[test]
	fn upsert_writes_expected_row() {
		let dir = TempDir::new().unwrap();
		let mut pool = pool(4, 0);
		let tile = coord(3, 10, 20);
		let handle = acquire(&mut pool, dir.path(), &tile);
		assert_eq!(handle.key().to_string(), "3:0:0");
		pool.upsert(handle, &record(tile, "ABC")).unwrap();
		pool.close_all().unwrap();

		let address = ShardAddress::resolve(dir.path(), &tile, "sqlitedb");
		let tiles = ShardReader::open(&address.file).unwrap().tiles().unwrap();
		assert_eq!(tiles.len(), 1);
		let row = &tiles[0];
		assert_eq!((row.x, row.y, row.version), (10, 20, 0));
		assert_eq!(row.size, 3);
		assert_eq!(row.hash, crc32("ABC"));
		assert_eq!(row.blob, Blob::from("ABC"));
		assert_eq!(row.timestamp, 1_700_000_000);
	}

	fn crc32(text: &str) -> u32 {
		Blob::from(text).crc32()
	}

	#[test]
	fn upsert_replaces_same_key() {
		let dir = TempDir::new().unwrap();
		let mut pool = pool(4, 0);
		let tile = coord(3, 10, 20);
		let handle = acquire(&mut pool, dir.path(), &tile);
		pool.upsert(handle, &record(tile, "old")).unwrap();
		pool.upsert(handle, &record(tile, "new")).unwrap();
		pool.upsert(handle, &record(tile, "v1").with_version(1)).unwrap();
		pool.close_all().unwrap();

		let address = ShardAddress::resolve(dir.path(), &tile, "sqlitedb");
		let reader = ShardReader::open(&address.file).unwrap();
		assert_eq!(reader.count().unwrap(), 2);
		assert_eq!(reader.get_tile(10, 20, 0).unwrap().unwrap().blob, Blob::from("new"));
		assert_eq!(reader.get_tile(10, 20, 1).unwrap().unwrap().blob, Blob::from("v1"));
	}

	#[test]
	fn flush_all_commits_and_keeps_writers() {
		let dir = TempDir::new().unwrap();
		let mut pool = pool(4, 0);
		let a = coord(12, 0, 0);
		let b = coord(12, 256, 0);
		let ha = acquire(&mut pool, dir.path(), &a);
		let hb = acquire(&mut pool, dir.path(), &b);
		pool.upsert(ha, &record(a, "a")).unwrap();
		pool.upsert(hb, &record(b, "b")).unwrap();
		assert_eq!(count(dir.path(), &a), 0);

		pool.flush_all().unwrap();
		assert_eq!(count(dir.path(), &a), 1);
		assert_eq!(count(dir.path(), &b), 1);
		assert_eq!(pool.len(), 2);

		pool.upsert(ha, &record(coord(12, 1, 0), "a2")).unwrap();
		assert_eq!(pool.stats().opened, 2);
		pool.close_all().unwrap();
		assert_eq!(count(dir.path(), &a), 2);
	}

	#[test]
	fn insert_threshold_triggers_flush() {
		let dir = TempDir::new().unwrap();
		let mut pool = pool(4, 2);
		let a = coord(12, 0, 0);
		let handle = acquire(&mut pool, dir.path(), &a);
		pool.upsert(handle, &record(coord(12, 0, 0), "1")).unwrap();
		assert_eq!(count(dir.path(), &a), 0);
		pool.upsert(handle, &record(coord(12, 0, 1), "2")).unwrap();
		assert_eq!(count(dir.path(), &a), 2);
		pool.upsert(handle, &record(coord(12, 0, 2), "3")).unwrap();
		assert_eq!(count(dir.path(), &a), 2);
		assert_eq!(pool.stats().flushes, 1);
		assert_eq!(pool.stats().inserts, 3);
	}

	#[test]
	fn close_all_empties_pool() {
		let dir = TempDir::new().unwrap();
		let mut pool = pool(4, 0);
		let a = coord(12, 0, 0);
		let handle = acquire(&mut pool, dir.path(), &a);
		pool.upsert(handle, &record(a, "a")).unwrap();
		acquire(&mut pool, dir.path(), &coord(12, 256, 0));
		pool.close_all().unwrap();
		assert!(pool.is_empty());
		assert_eq!(pool.keys().count(), 0);
		assert_eq!(count(dir.path(), &a), 1);
		// closing twice is harmless
		pool.close_all().unwrap();
		assert!(pool.upsert(handle, &record(a, "a")).is_err());
	}
}
