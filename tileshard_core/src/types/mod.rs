mod blob;
pub use blob::*;

mod shard;
pub use shard::*;

mod source_format;
pub use source_format::*;

mod tile_coord;
pub use tile_coord::*;

mod tile_record;
pub use tile_record::*;
