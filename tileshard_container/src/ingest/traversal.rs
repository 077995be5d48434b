//! Walks a source cache and feeds every file into a [`TileIngester`].
//!
//! The walk descends a fixed number of levels below the input directory (3 for `tms`, 6 for the
//! hashed layouts). Only entries found exactly at that depth are treated as tiles. Entries are
//! visited in name order, so repeated runs write shards in the same order.

use crate::{IngestConfig, IngestStats, TileIngester};
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use std::{fs, path::Path};

/// Calls `visit` for every file exactly `depth` levels below `dir`.
///
/// Directories found at depth 0 and files found above it are logged and ignored.
pub fn traverse_files<F>(dir: &Path, depth: usize, visit: &mut F) -> Result<()>
where
	F: FnMut(&Path) -> Result<()>,
{
	if depth == 0 {
		if dir.is_file() {
			return visit(dir);
		}
		log::warn!("is not a file: {dir:?}");
		return Ok(());
	}

	if !dir.is_dir() {
		log::warn!("is not a directory: {dir:?}");
		return Ok(());
	}

	let entries = fs::read_dir(dir)
		.with_context(|| format!("listing {dir:?}"))?
		.map(|entry| entry.map(|e| e.path()))
		.collect::<Result<Vec<_>, _>>()
		.with_context(|| format!("listing {dir:?}"))?;

	for path in entries.into_iter().sorted_unstable() {
		traverse_files(&path, depth - 1, visit)?;
	}
	Ok(())
}

/// Converts the cache below `input_dir` into shards as configured, optionally restricted to one zoom level.
pub fn convert_directory(input_dir: &Path, zoom: Option<u8>, config: IngestConfig) -> Result<IngestStats> {
	ensure!(input_dir.is_dir(), "input directory {input_dir:?} does not exist");

	let mut depth = config.format.depth();
	let start = match zoom {
		Some(level) => {
			depth -= 1;
			input_dir.join(level.to_string())
		}
		None => input_dir.to_path_buf(),
	};
	log::info!("convert {:?} ({}) into {:?}", start, config.format, config.output_dir);

	let mut ingester = TileIngester::new(config)?;
	traverse_files(&start, depth, &mut |path: &Path| ingester.ingest_file(path).map(|_| ()))?;
	let stats = ingester.finish()?;

	log::info!("{stats}");
	Ok(stats)
}
