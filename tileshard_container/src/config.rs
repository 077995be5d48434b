use std::path::{Path, PathBuf};
use tileshard_core::SourceFormat;

/// File extension of shard files.
pub const SHARD_EXTENSION: &str = "sqlitedb";

/// Limits of a [`WriterPool`](crate::WriterPool).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
	/// Maximum number of shard files open at the same time.
	pub max_writers: usize,
	/// Commit all open shards after this many upserts; `0` defers commits to eviction and close.
	pub max_inserts: u64,
}

impl Default for PoolConfig {
	fn default() -> Self {
		Self {
			max_writers: 128,
			max_inserts: 0,
		}
	}
}

/// Everything a [`TileIngester`](crate::TileIngester) needs to know about a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestConfig {
	pub format: SourceFormat,
	pub output_dir: PathBuf,
	pub extension: String,
	/// Version written with every tile.
	pub version: u32,
	pub pool: PoolConfig,
}

impl IngestConfig {
	#[must_use]
	pub fn new(format: SourceFormat, output_dir: &Path) -> Self {
		Self {
			format,
			output_dir: output_dir.to_path_buf(),
			extension: String::from(SHARD_EXTENSION),
			version: 0,
			pool: PoolConfig::default(),
		}
	}
}
