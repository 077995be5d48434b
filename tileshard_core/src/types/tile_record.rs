//! One stored row of a shard: a tile payload plus the metadata kept next to it.

use crate::{Blob, TileCoord};

/// A tile ready to be written into a shard.
///
/// `size` and `hash` are derived from the payload, so they always describe the blob that is stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileRecord {
	pub coord: TileCoord,
	pub version: u32,
	pub content_type: Option<String>,
	pub timestamp: i64,
	pub blob: Blob,
}

impl TileRecord {
	/// Creates a record with the default version `0` and no content type.
	#[must_use]
	pub fn new(coord: TileCoord, blob: Blob, timestamp: i64) -> TileRecord {
		TileRecord {
			coord,
			version: 0,
			content_type: None,
			timestamp,
			blob,
		}
	}

	#[must_use]
	pub fn with_version(mut self, version: u32) -> TileRecord {
		self.version = version;
		self
	}

	#[must_use]
	pub fn size(&self) -> u64 {
		self.blob.len()
	}

	#[must_use]
	pub fn hash(&self) -> u32 {
		self.blob.crc32()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn derived_fields() {
		let coord = TileCoord::new(3, 10, 20).unwrap();
		let record = TileRecord::new(coord, Blob::from("ABC"), 1_700_000_000).with_version(2);
		assert_eq!(record.version, 2);
		assert_eq!(record.size(), 3);
		assert_eq!(record.hash(), 0xa383_0348);
		assert_eq!(record.content_type, None);
	}
}
