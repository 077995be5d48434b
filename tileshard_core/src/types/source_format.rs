//! The layout of the source cache being converted.

use anyhow::{Result, bail};
#[cfg(feature = "cli")]
use clap::ValueEnum;
use std::fmt::Display;

/// Source cache layouts.
#[cfg_attr(feature = "cli", derive(ValueEnum))]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SourceFormat {
	/// one tile per file, `<z>/<x>/<y>.<ext>`
	#[default]
	Tms,
	/// one tile per file, `<z>/<h1>/<h2>/<h3>/<h4>/<h5>.<ext>` with x/y interleaved as nibbles
	Htms,
	/// metatile bundles of up to 8×8 tiles, laid out like `htms`
	Meta,
}

impl SourceFormat {
	pub fn as_str(&self) -> &str {
		match self {
			SourceFormat::Tms => "tms",
			SourceFormat::Htms => "htms",
			SourceFormat::Meta => "meta",
		}
	}

	pub fn parse_str(value: &str) -> Result<Self> {
		Ok(match value.to_lowercase().trim() {
			"tms" => SourceFormat::Tms,
			"htms" => SourceFormat::Htms,
			"meta" => SourceFormat::Meta,
			_ => bail!("Unknown source format. Expected tms, htms or meta"),
		})
	}

	/// Number of directory levels below the input root, the file name included.
	pub fn depth(&self) -> usize {
		match self {
			SourceFormat::Tms => 3,
			SourceFormat::Htms | SourceFormat::Meta => 6,
		}
	}

	/// Whether every file holds a metatile bundle instead of a single tile.
	pub fn is_bundle(&self) -> bool {
		matches!(self, SourceFormat::Meta)
	}
}

impl Display for SourceFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
