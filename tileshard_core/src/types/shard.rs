//! Address sharding: maps a tile coordinate to the store file and directory holding it.
//!
//! Tiles are grouped into shards of 256×256 tiles (`x >> 8`, `y >> 8`), and shard files are
//! grouped into directories covering 1024×1024 tiles (`x >> 10`, `y >> 10`):
//!
//! ```text
//! <root>/z<zoom + 1>/<x >> 10>/<y >> 10>/<x >> 8>.<y >> 8>.<ext>
//! ```
//!
//! # Examples
//!
//! ```
//! use tileshard_core::{ShardAddress, ShardKey, TileCoord};
//! use std::path::Path;
//!
//! let coord = TileCoord::new(12, 2200, 1300).unwrap();
//! assert_eq!(ShardKey::from_coord(&coord).to_string(), "12:8:5");
//!
//! let address = ShardAddress::resolve(Path::new("/out"), &coord, "sqlitedb");
//! assert_eq!(address.file, Path::new("/out/z13/2/1/8.5.sqlitedb"));
//! ```

use crate::TileCoord;
use std::{
	fmt::{self, Display},
	path::{Path, PathBuf},
};

/// Number of coordinate bits covered by one shard file.
pub const SHARD_BITS: u32 = 8;

/// Number of coordinate bits covered by one shard directory.
pub const DIRECTORY_BITS: u32 = 10;

/// Identifies one shard: all tiles with equal `(level, x >> 8, y >> 8)`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct ShardKey {
	pub level: u8,
	pub x: u32,
	pub y: u32,
}

impl ShardKey {
	#[must_use]
	pub fn from_coord(coord: &TileCoord) -> ShardKey {
		ShardKey {
			level: coord.level,
			x: coord.x >> SHARD_BITS,
			y: coord.y >> SHARD_BITS,
		}
	}
}

impl Display for ShardKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}:{}", self.level, self.x, self.y)
	}
}

/// Location of a shard file on disk.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShardAddress {
	pub dir: PathBuf,
	pub file: PathBuf,
}

impl ShardAddress {
	/// Resolves the directory and file of the shard holding `coord` below `root`.
	#[must_use]
	pub fn resolve(root: &Path, coord: &TileCoord, extension: &str) -> ShardAddress {
		let dir = root
			.join(format!("z{}", u16::from(coord.level) + 1))
			.join((coord.x >> DIRECTORY_BITS).to_string())
			.join((coord.y >> DIRECTORY_BITS).to_string());
		let file = dir.join(format!(
			"{}.{}.{extension}",
			coord.x >> SHARD_BITS,
			coord.y >> SHARD_BITS
		));
		ShardAddress { dir, file }
	}
}
