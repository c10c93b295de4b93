//! Schema
//!
//! Creates the `sort_key_cache` table on first access.

use rusqlite::{params, Connection};

use crate::error::Result;

/// Name of the single cache table
pub const TABLE_NAME: &str = "sort_key_cache";

const CREATE_TABLE_SQL: &str = "
    CREATE TABLE sort_key_cache (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        key TEXT NOT NULL,
        sort_key TEXT NOT NULL,
        value TEXT NOT NULL,
        state_hash TEXT,
        signature TEXT,
        UNIQUE (key, sort_key)
    );

    CREATE INDEX idx_sort_key_cache_sort_key ON sort_key_cache (sort_key);
";

/// Check whether the cache table already exists
pub fn table_exists(conn: &Connection) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        params![TABLE_NAME],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Create the table if it is missing
///
/// Returns `true` when the table was created by this call. Persistent stores
/// get `auto_vacuum = FULL` and one `VACUUM` pass, only at creation.
pub fn initialize(conn: &Connection, persistent: bool) -> Result<bool> {
    if table_exists(conn)? {
        return Ok(false);
    }

    // auto_vacuum only takes effect before the first table, or after VACUUM
    if persistent {
        conn.execute_batch("PRAGMA auto_vacuum = FULL;")?;
    }

    conn.execute_batch(CREATE_TABLE_SQL)?;

    if persistent {
        conn.execute_batch("VACUUM;")?;
    }

    Ok(true)
}
