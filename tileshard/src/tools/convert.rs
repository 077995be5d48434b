use anyhow::Result;
use std::path::PathBuf;
use tileshard_container::{IngestConfig, PoolConfig, SHARD_EXTENSION, convert_directory};
use tileshard_core::SourceFormat;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// directory of the source tile cache
	#[arg()]
	input_dir: PathBuf,

	/// directory receiving the shard files
	#[arg()]
	output_dir: PathBuf,

	/// layout of the source cache
	#[arg(long, short, value_enum, default_value_t = SourceFormat::Tms, display_order = 1)]
	format: SourceFormat,

	/// only convert this zoom level
	#[arg(long, short, value_name = "int", display_order = 1)]
	zoom: Option<u8>,

	/// maximum number of shard files open at the same time
	#[arg(long, value_name = "int", default_value_t = 128, value_parser = clap::value_parser!(u64).range(1..), display_order = 2)]
	max_writers: u64,

	/// commit all open shards after this many tiles, 0 commits only when a shard is closed
	#[arg(long, value_name = "int", default_value_t = 0, display_order = 2)]
	max_inserts: u64,

	/// version stored with every tile
	#[arg(long, value_name = "int", default_value_t = 0, display_order = 3)]
	tile_version: u32,
}

impl Subcommand {
	fn config(&self) -> IngestConfig {
		IngestConfig {
			format: self.format,
			output_dir: self.output_dir.clone(),
			extension: String::from(SHARD_EXTENSION),
			version: self.tile_version,
			pool: PoolConfig {
				max_writers: usize::try_from(self.max_writers).unwrap_or(usize::MAX),
				max_inserts: self.max_inserts,
			},
		}
	}
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	let stats = convert_directory(&arguments.input_dir, arguments.zoom, arguments.config())?;

	log::info!("finished converting {} tiles", stats.tiles_stored);
	Ok(())
}
