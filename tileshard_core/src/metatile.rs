//! Metatile bundles: one file packing up to 8×8 tiles behind an offset/size directory.
//!
//! All integers are little-endian `u32`:
//!
//! ```text
//! offset  content
//! 0       magic "META"
//! 4       count
//! 8       x of the top-left tile
//! 12      y of the top-left tile
//! 16      zoom level
//! 20      count × (offset, size), offsets relative to the start of the bundle
//! ```
//!
//! Slot `i` holds the tile at `(x + i / 8, y + i % 8)`.
//!
//! ```
//! use tileshard_core::{Blob, TileCoord, decode_metatile, encode_metatile};
//!
//! let coord = TileCoord::new(5, 16, 24).unwrap();
//! let bundle = encode_metatile(&coord, &[Blob::from("a"), Blob::from("bc")]).unwrap();
//! let tiles = decode_metatile(&coord, &bundle).unwrap();
//! assert_eq!(tiles[1].coord, TileCoord::new(5, 16, 25).unwrap());
//! assert_eq!(tiles[1].blob, Blob::from("bc"));
//! ```

use crate::{Blob, IngestError, TileCoord, io::ValueReaderSlice};
use anyhow::{Result, ensure};
use byteorder::{ByteOrder, LittleEndian};

pub const METATILE_MAGIC: &[u8; 4] = b"META";

/// Edge length of the tile grid covered by one bundle.
pub const METATILE_SIZE: u32 = 8;

/// Maximum number of slots in one bundle.
pub const METATILE_MAX_COUNT: u32 = METATILE_SIZE * METATILE_SIZE;

const HEADER_LEN: u64 = 20;
const ENTRY_LEN: u64 = 8;

/// One tile extracted from a bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetatileEntry {
	pub coord: TileCoord,
	pub blob: Blob,
}

/// Validates a bundle discovered at `expected` and splits it into its tiles.
///
/// Fails with [`IngestError::CorruptBundle`] on a wrong magic marker, an embedded coordinate
/// that differs from `expected`, or a header/directory pointing outside the payload.
pub fn decode_metatile(expected: &TileCoord, blob: &Blob) -> Result<Vec<MetatileEntry>> {
	let corrupt = |reason: String| IngestError::CorruptBundle {
		coord: *expected,
		reason,
	};

	let mut reader = ValueReaderSlice::new_le(blob.as_slice());
	let magic = reader
		.read_bytes(4)
		.map_err(|_| corrupt(format!("payload of {} bytes is too short for a header", blob.len())))?;
	if magic != METATILE_MAGIC {
		return Err(corrupt(format!(
			"wrong magic {:?}, expected \"META\": looks like a single tile, try to use '-f htms' instead",
			String::from_utf8_lossy(&magic)
		))
		.into());
	}
	if blob.len() < HEADER_LEN {
		return Err(corrupt(format!("payload of {} bytes is too short for a header", blob.len())).into());
	}

	let count = reader.read_u32()?;
	let x = reader.read_u32()?;
	let y = reader.read_u32()?;
	let level = reader.read_u32()?;

	if (level, x, y) != (u32::from(expected.level), expected.x, expected.y) {
		return Err(corrupt(format!("embedded coordinate {level}/{x}/{y} does not match the file path")).into());
	}
	if count > METATILE_MAX_COUNT {
		return Err(corrupt(format!("count {count} exceeds {METATILE_MAX_COUNT} slots")).into());
	}
	if reader.remaining() < u64::from(count) * ENTRY_LEN {
		return Err(corrupt(format!("directory of {count} entries exceeds payload of {} bytes", blob.len())).into());
	}

	let mut entries = Vec::with_capacity(count as usize);
	for i in 0..count {
		let offset = reader.read_u32()?;
		let size = reader.read_u32()?;
		let start = offset as usize;
		let end = start + size as usize;
		let data = blob.get_range(start..end).ok_or_else(|| {
			corrupt(format!(
				"slot {i} range {start}..{end} exceeds payload of {} bytes",
				blob.len()
			))
		})?;
		let coord = expected.offset(i / METATILE_SIZE, i % METATILE_SIZE)?;
		log::trace!("metatile slot {i}: offset={offset} size={size} coord={coord}");
		entries.push(MetatileEntry {
			coord,
			blob: Blob::from(data),
		});
	}

	Ok(entries)
}

/// Packs `tiles` into a bundle whose top-left tile is `coord`, the inverse of [`decode_metatile`].
pub fn encode_metatile(coord: &TileCoord, tiles: &[Blob]) -> Result<Blob> {
	ensure!(
		tiles.len() <= METATILE_MAX_COUNT as usize,
		"a metatile holds at most {METATILE_MAX_COUNT} tiles, got {}",
		tiles.len()
	);
	let count = tiles.len() as u32;
	let directory_len = HEADER_LEN as usize + tiles.len() * ENTRY_LEN as usize;
	let payload_len: usize = tiles.iter().map(|t| t.as_slice().len()).sum();

	let mut buffer = vec![0u8; directory_len];
	buffer[0..4].copy_from_slice(METATILE_MAGIC);
	LittleEndian::write_u32(&mut buffer[4..8], count);
	LittleEndian::write_u32(&mut buffer[8..12], coord.x);
	LittleEndian::write_u32(&mut buffer[12..16], coord.y);
	LittleEndian::write_u32(&mut buffer[16..20], u32::from(coord.level));
	buffer.reserve(payload_len);

	for (i, tile) in tiles.iter().enumerate() {
		let entry = HEADER_LEN as usize + i * ENTRY_LEN as usize;
		let offset = u32::try_from(buffer.len())?;
		let size = u32::try_from(tile.as_slice().len())?;
		LittleEndian::write_u32(&mut buffer[entry..entry + 4], offset);
		LittleEndian::write_u32(&mut buffer[entry + 4..entry + 8], size);
		buffer.extend_from_slice(tile.as_slice());
	}

	Ok(Blob::from(buffer))
}
