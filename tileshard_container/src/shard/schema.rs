//! Table layout of a shard file.
//!
//! | column | content                                  |
//! |--------|------------------------------------------|
//! | `x`    | tile column                              |
//! | `y`    | tile row                                 |
//! | `v`    | version, `0` unless supplied             |
//! | `c`    | content type, unused by ingestion        |
//! | `s`    | payload size in bytes                    |
//! | `h`    | CRC-32 of the payload                    |
//! | `d`    | ingestion time, Unix seconds             |
//! | `b`    | payload                                  |
//!
//! `(x, y, v)` is the primary key, and `v` carries a secondary index.

use anyhow::{Context, Result};
use r2d2_sqlite::rusqlite::Connection;

pub const TILE_TABLE: &str = "t";

const CREATE_SCHEMA: &str = "CREATE TABLE t (x INTEGER NOT NULL, y INTEGER NOT NULL, v INTEGER DEFAULT 0 NOT NULL, c TEXT, s INTEGER DEFAULT 0 NOT NULL, h INTEGER DEFAULT 0 NOT NULL, d INTEGER NOT NULL, b BLOB, CONSTRAINT PK_TB PRIMARY KEY (x, y, v));
	CREATE INDEX t_v_idx ON t (v);";

/// Whether the tile table already exists in `connection`.
pub fn has_schema(connection: &Connection) -> Result<bool> {
	let count: i64 = connection
		.query_row(
			"SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND tbl_name = ?1",
			[TILE_TABLE],
			|row| row.get(0),
		)
		.context("querying sqlite_master")?;
	Ok(count > 0)
}

/// Creates the tile table and its index unless they exist. Returns `true` if they were created.
pub fn ensure_schema(connection: &Connection) -> Result<bool> {
	if has_schema(connection)? {
		return Ok(false);
	}
	connection.execute_batch(CREATE_SCHEMA).context("creating tile table")?;
	Ok(true)
}
