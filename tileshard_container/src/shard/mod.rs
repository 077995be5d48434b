//! One SQLite file per shard.
//!
//! - `schema`: creates the tile table on first use
//! - `ShardWriter`: an open shard with lazy transactions
//! - `ShardReader`: read access for verification
//! - `WriterPool`: a bounded set of open writers with FIFO eviction

mod pool;
mod reader;
mod schema;
mod writer;

pub use pool::*;
pub use reader::*;
pub use schema::*;
pub use writer::*;
