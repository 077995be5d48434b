//! Error kinds raised while ingesting a tile cache.
//!
//! Only [`IngestError::SkippedInput`] is recoverable: the file is logged and traversal continues.
//! Every other variant aborts the run. Filesystem and SQLite failures are not listed here; they
//! propagate unchanged as `anyhow::Error` with context naming the file or shard involved.

use crate::{SourceFormat, TileCoord};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
	#[error("skip {path:?}: does not match the {format} addressing pattern")]
	SkippedInput { path: PathBuf, format: SourceFormat },

	#[error("{} found in {path:?} while reading format '{format}'! {}", found_kind(.format), advice(.hint.as_ref()))]
	FormatMismatch {
		path: PathBuf,
		format: SourceFormat,
		hint: Option<SourceFormat>,
	},

	#[error("corrupt metatile at {coord}: {reason}")]
	CorruptBundle { coord: TileCoord, reason: String },

	#[error(
		"shard handle '{shard}' is not open while writing tile {coord} (size={size}, crc32={checksum}, blob[0:256]={preview})"
	)]
	StoreFault {
		shard: String,
		coord: TileCoord,
		size: u64,
		checksum: u32,
		preview: String,
	},
}

fn found_kind(format: &SourceFormat) -> &'static str {
	if format.is_bundle() {
		"non-metatile file"
	} else {
		"metatile file"
	}
}

fn advice(hint: Option<&SourceFormat>) -> String {
	match hint {
		Some(format) => format!("try to use '-f {format}' instead"),
		None => String::from("metatiles are only read from the hashed layout"),
	}
}

impl IngestError {
	/// Whether the run may continue after this error.
	pub fn is_recoverable(&self) -> bool {
		matches!(self, IngestError::SkippedInput { .. })
	}
}
