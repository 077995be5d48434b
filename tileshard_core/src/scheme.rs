//! Source addressing schemes: how a tile coordinate is encoded in a path of the source cache.
//!
//! | format        | relative path                          |
//! |---------------|----------------------------------------|
//! | `tms`         | `<z>/<x>/<y>.<ext>`                    |
//! | `htms`/`meta` | `<z>/<h1>/<h2>/<h3>/<h4>/<h5>.<ext>`   |
//!
//! In the hashed layout every `h` is a decimal byte: its high nibble contributes four bits to `x`,
//! its low nibble four bits to `y`, most significant segment first. Five segments therefore
//! address coordinates below `2^20`.
//!
//! ```
//! use tileshard_core::{SourceFormat, detect_tile};
//! use std::path::Path;
//!
//! let tile = detect_tile(SourceFormat::Htms, Path::new("/cache/7/0/0/0/18/171.png")).unwrap();
//! assert_eq!((tile.coord.level, tile.coord.x, tile.coord.y), (7, 0x1A, 0x2B));
//! assert_eq!(tile.extension, "png");
//! ```

use crate::{IngestError, SourceFormat, TileCoord};
use anyhow::{Result, ensure};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Component, Path, PathBuf};

/// Number of nibble-pair segments in the hashed layout.
pub const HASHED_SEGMENTS: usize = 5;

/// Coordinates in the hashed layout must be below this value.
pub const HASHED_LIMIT: u32 = 1 << (4 * HASHED_SEGMENTS);

lazy_static! {
	static ref REGEX_TMS: Regex = Regex::new(r"^(\d+)/(\d+)/(\d+)\.(\w+)$").unwrap();
	static ref REGEX_HASHED: Regex = Regex::new(r"^(\d+)/(\d+)/(\d+)/(\d+)/(\d+)/(\d+)\.(\w+)$").unwrap();
}

/// A source file whose path matched the active addressing pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectedTile {
	pub coord: TileCoord,
	pub extension: String,
}

/// Derives the tile coordinate and file extension from a source path.
///
/// Returns [`IngestError::SkippedInput`] if the path does not follow the layout of `format`.
pub fn detect_tile(format: SourceFormat, path: &Path) -> Result<DetectedTile, IngestError> {
	parse_tail(format, path).ok_or_else(|| IngestError::SkippedInput {
		path: path.to_path_buf(),
		format,
	})
}

fn parse_tail(format: SourceFormat, path: &Path) -> Option<DetectedTile> {
	let depth = format.depth();
	let names: Vec<&str> = path
		.components()
		.filter_map(|c| match c {
			Component::Normal(name) => name.to_str(),
			_ => None,
		})
		.collect();
	if names.len() < depth {
		return None;
	}
	let tail = names[names.len() - depth..].join("/");

	match format {
		SourceFormat::Tms => {
			let caps = REGEX_TMS.captures(&tail)?;
			let coord = TileCoord::new(caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?).ok()?;
			Some(DetectedTile {
				coord,
				extension: caps[4].to_string(),
			})
		}
		SourceFormat::Htms | SourceFormat::Meta => {
			let caps = REGEX_HASHED.captures(&tail)?;
			let mut segments = [0u8; HASHED_SEGMENTS];
			for (i, segment) in segments.iter_mut().enumerate() {
				*segment = caps[i + 2].parse().ok()?;
			}
			let (x, y) = decode_nibbles(&segments);
			let coord = TileCoord::new(caps[1].parse().ok()?, x, y).ok()?;
			Some(DetectedTile {
				coord,
				extension: caps[7].to_string(),
			})
		}
	}
}

/// Reassembles `x` and `y` from hashed path segments, most significant segment first.
#[must_use]
pub fn decode_nibbles(segments: &[u8; HASHED_SEGMENTS]) -> (u32, u32) {
	segments.iter().fold((0u32, 0u32), |(x, y), h| {
		((x << 4) | u32::from(h >> 4), (y << 4) | u32::from(h & 0x0f))
	})
}

/// Splits `x` and `y` into hashed path segments, most significant segment first.
pub fn encode_nibbles(x: u32, y: u32) -> Result<[u8; HASHED_SEGMENTS]> {
	ensure!(
		x < HASHED_LIMIT && y < HASHED_LIMIT,
		"coordinates ({x}, {y}) do not fit into {HASHED_SEGMENTS} hashed segments"
	);
	let mut segments = [0u8; HASHED_SEGMENTS];
	for (i, segment) in segments.iter_mut().enumerate() {
		let shift = 4 * (HASHED_SEGMENTS - 1 - i);
		*segment = (((x >> shift) & 0x0f) << 4 | ((y >> shift) & 0x0f)) as u8;
	}
	Ok(segments)
}

/// Builds the path of a tile relative to the cache root, the inverse of [`detect_tile`].
pub fn relative_tile_path(format: SourceFormat, coord: &TileCoord, extension: &str) -> Result<PathBuf> {
	let mut path = PathBuf::from(coord.level.to_string());
	match format {
		SourceFormat::Tms => {
			path.push(coord.x.to_string());
			path.push(format!("{}.{extension}", coord.y));
		}
		SourceFormat::Htms | SourceFormat::Meta => {
			let [h1, h2, h3, h4, h5] = encode_nibbles(coord.x, coord.y)?;
			for segment in [h1, h2, h3, h4] {
				path.push(segment.to_string());
			}
			path.push(format!("{h5}.{extension}"));
		}
	}
	Ok(path)
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	fn detected(level: u8, x: u32, y: u32, extension: &str) -> DetectedTile {
		DetectedTile {
			coord: TileCoord::new(level, x, y).unwrap(),
			extension: extension.to_string(),
		}
	}

	#[test]
	fn nibbles_round_trip() {
		let segments = encode_nibbles(0x1A, 0x2B).unwrap();
		assert_eq!(segments, [0, 0, 0, 0x12, 0xAB]);
		assert_eq!(decode_nibbles(&segments), (0x1A, 0x2B));

		let segments = encode_nibbles(0xF_FFFF, 0x1_2345).unwrap();
		assert_eq!(decode_nibbles(&segments), (0xF_FFFF, 0x1_2345));
	}

	#[test]
	fn nibbles_reject_large_coordinates() {
		assert!(encode_nibbles(HASHED_LIMIT, 0).is_err());
		assert!(encode_nibbles(0, HASHED_LIMIT).is_err());
	}

	#[rstest]
	#[case("/cache/3/10/20.png", detected(3, 10, 20, "png"))]
	#[case("cache/tiles/18/140000/90000.jpg", detected(18, 140_000, 90_000, "jpg"))]
	#[case("./3/10/20.png", detected(3, 10, 20, "png"))]
	#[case("/3/10/20.png", detected(3, 10, 20, "png"))]
	#[case("3/10/20.png", detected(3, 10, 20, "png"))]
	fn detect_tms(#[case] path: &str, #[case] expected: DetectedTile) {
		assert_eq!(detect_tile(SourceFormat::Tms, Path::new(path)).unwrap(), expected);
	}

	#[rstest]
	#[case(SourceFormat::Htms, "/cache/7/0/0/0/18/171.png", detected(7, 0x1A, 0x2B, "png"))]
	#[case(SourceFormat::Meta, "/cache/5/0/0/0/17/8.meta", detected(5, 16, 24, "meta"))]
	#[case(SourceFormat::Htms, "./7/0/0/0/18/171.png", detected(7, 0x1A, 0x2B, "png"))]
	#[case(SourceFormat::Htms, "/7/0/0/0/18/171.png", detected(7, 0x1A, 0x2B, "png"))]
	fn detect_hashed(#[case] format: SourceFormat, #[case] path: &str, #[case] expected: DetectedTile) {
		assert_eq!(detect_tile(format, Path::new(path)).unwrap(), expected);
	}

	#[rstest]
	#[case(SourceFormat::Tms, "/cache/3/10/readme.txt")]
	#[case(SourceFormat::Tms, "/cache/3/10/20")]
	#[case(SourceFormat::Tms, "10/20.png")]
	#[case(SourceFormat::Tms, "/cache/3/10/20.png.bak")]
	#[case(SourceFormat::Tms, "/cache/3/10/99999999999.png")]
	#[case(SourceFormat::Tms, "/cache/40/10/20.png")]
	#[case(SourceFormat::Htms, "/cache/7/0/0/0/18/256.png")]
	#[case(SourceFormat::Htms, "/cache/7/10/20.png")]
	#[case(SourceFormat::Meta, "/cache/7/0/0/x/0/0.meta")]
	fn detect_skips(#[case] format: SourceFormat, #[case] path: &str) {
		let err = detect_tile(format, Path::new(path)).unwrap_err();
		assert!(err.is_recoverable());
		assert!(matches!(err, IngestError::SkippedInput { .. }));
	}

	#[rstest]
	#[case(SourceFormat::Tms, "3/10/20.png")]
	#[case(SourceFormat::Htms, "7/0/0/0/18/171.png")]
	fn relative_path(#[case] format: SourceFormat, #[case] expected: &str) {
		let coord = match format {
			SourceFormat::Tms => TileCoord::new(3, 10, 20).unwrap(),
			_ => TileCoord::new(7, 0x1A, 0x2B).unwrap(),
		};
		let path = relative_tile_path(format, &coord, "png").unwrap();
		assert_eq!(path, PathBuf::from(expected));
		let absolute = Path::new("/cache").join(&path);
		assert_eq!(detect_tile(format, &absolute).unwrap().coord, coord);
	}
}
