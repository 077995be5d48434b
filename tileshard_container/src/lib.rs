//! Sharded SQLite tile stores: schema, shard handles, the bounded writer pool and the ingester
//! that feeds a directory tile cache into them.
//!
//! # Quick start
//! ```rust,no_run
//! use tileshard_container::*;
//! use tileshard_core::SourceFormat;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = IngestConfig::new(SourceFormat::Tms, Path::new("/data/output"));
//!     let stats = convert_directory(Path::new("/data/cache"), None, config)?;
//!     println!("{stats}");
//!     Ok(())
//! }
//! ```

mod config;
pub use config::*;

mod ingest;
pub use ingest::*;

mod shard;
pub use shard::*;
