//! This module defines the `TileCoord` structure, the (zoom, x, y) triple identifying a single map tile.
//!
//! # Examples
//!
//! ```
//! use tileshard_core::TileCoord;
//!
//! let coord = TileCoord::new(5, 6, 7).unwrap();
//! assert_eq!(coord.level, 5);
//! assert_eq!(coord.x, 6);
//! assert_eq!(coord.y, 7);
//! assert_eq!(coord.to_string(), "5/6/7");
//! ```

use anyhow::{Result, ensure};
use std::fmt::{self, Debug, Display};

/// Highest zoom level a coordinate may carry.
pub const MAX_LEVEL: u8 = 31;

#[derive(Eq, PartialEq, Clone, Hash, Copy)]
pub struct TileCoord {
	pub x: u32,
	pub y: u32,
	pub level: u8,
}

impl TileCoord {
	pub fn new(level: u8, x: u32, y: u32) -> Result<TileCoord> {
		ensure!(level <= MAX_LEVEL, "level ({level}) must be <= {MAX_LEVEL}");
		Ok(TileCoord { x, y, level })
	}

	/// Returns the coordinate shifted by `dx` columns and `dy` rows on the same level.
	pub fn offset(&self, dx: u32, dy: u32) -> Result<TileCoord> {
		let x = self.x.checked_add(dx);
		let y = self.y.checked_add(dy);
		match (x, y) {
			(Some(x), Some(y)) => Ok(TileCoord { x, y, level: self.level }),
			_ => anyhow::bail!("offset ({dx}, {dy}) overflows {self}"),
		}
	}
}

impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_fmt(format_args!("TileCoord({}, [{}, {}])", &self.level, &self.x, &self.y))
	}
}

impl Display for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}/{}", self.level, self.x, self.y)
	}
}

impl PartialOrd for TileCoord {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for TileCoord {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		self.level
			.cmp(&other.level)
			.then(self.y.cmp(&other.y))
			.then(self.x.cmp(&other.x))
	}
}
