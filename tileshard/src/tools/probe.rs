use anyhow::{Result, bail};
use std::path::PathBuf;
use tileshard_container::ShardReader;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// shard file (*.sqlitedb)
	#[arg(required = true)]
	filename: PathBuf,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	log::info!("probe {:?}", arguments.filename);

	let summary = ShardReader::open(&arguments.filename)?.probe()?;
	println!("{summary}");

	if !summary.inconsistent.is_empty() {
		bail!(
			"{} tiles in {:?} do not match their stored size or checksum",
			summary.inconsistent.len(),
			arguments.filename
		);
	}
	Ok(())
}
