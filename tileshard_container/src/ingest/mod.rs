//! Feeding a directory tile cache into shards.

mod ingester;
mod traversal;

pub use ingester::*;
pub use traversal::*;
