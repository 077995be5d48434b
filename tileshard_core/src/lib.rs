//! Core types for converting a directory tile cache into sharded tile stores.
//!
//! Contains tile coordinates, the shard addressing scheme, source path schemes,
//! the metatile bundle codec and the error taxonomy shared by the other crates.

pub mod error;
pub use error::IngestError;

pub mod io;

pub mod metatile;
pub use metatile::*;

pub mod scheme;
pub use scheme::*;

pub mod types;
pub use types::*;
