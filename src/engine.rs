//! Engine Module
//!
//! The versioned cache engine.
//!
//! ## Responsibilities
//! - Translate cache operations into ordered range queries and writes
//! - Apply the value codec at the read/write boundary
//! - Enforce per-key retention on every write
//! - Expose transaction control and the store lifecycle

use std::marker::PhantomData;

use rusqlite::{params, OptionalExtension, Params};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::SortKeyCache;
use crate::codec;
use crate::config::Config;
use crate::entry::{Entry, PruneStats, StoredRow};
use crate::error::{CacheError, Result};
use crate::retention::{self, RetentionPolicy};
use crate::storage::SqliteBackend;

// =============================================================================
// Statements
// =============================================================================

const SELECT_EXACT_SQL: &str = "
    SELECT key, sort_key, value, state_hash, signature FROM sort_key_cache
    WHERE key = ?1 AND sort_key = ?2
";

const SELECT_LAST_SQL: &str = "
    SELECT key, sort_key, value, state_hash, signature FROM sort_key_cache
    WHERE key = ?1
    ORDER BY sort_key DESC LIMIT 1
";

const SELECT_LESS_OR_EQUAL_SQL: &str = "
    SELECT key, sort_key, value, state_hash, signature FROM sort_key_cache
    WHERE key = ?1 AND sort_key <= ?2
    ORDER BY sort_key DESC LIMIT 1
";

const SELECT_LESS_SQL: &str = "
    SELECT key, sort_key, value, state_hash, signature FROM sort_key_cache
    WHERE key = ?1 AND sort_key < ?2
    ORDER BY sort_key DESC LIMIT 1
";

const SELECT_LAST_SORT_KEY_SQL: &str = "SELECT MAX(sort_key) FROM sort_key_cache";

const SELECT_KEYS_SQL: &str = "SELECT DISTINCT key FROM sort_key_cache ORDER BY key";

const COUNT_KEY_SQL: &str = "SELECT COUNT(*) FROM sort_key_cache WHERE key = ?1";

// A replaced entry keeps its id; hash and signature take the supplied values.
const UPSERT_SQL: &str = "
    INSERT INTO sort_key_cache (key, sort_key, value, state_hash, signature)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT (key, sort_key) DO UPDATE SET
        value = excluded.value,
        state_hash = excluded.state_hash,
        signature = excluded.signature
";

const DELETE_KEY_SQL: &str = "DELETE FROM sort_key_cache WHERE key = ?1";

const UPDATE_SIGNATURE_SQL: &str = "
    UPDATE sort_key_cache SET state_hash = ?3, signature = ?4
    WHERE key = ?1 AND sort_key = ?2
";

/// The versioned cache engine
///
/// ## Concurrency Model: Single Writer
///
/// - Every statement runs under the backend's connection lock
/// - `put` (upsert + eviction) runs under one lock acquisition, but is not
///   its own transaction; wrap sequences in `begin`/`commit` for atomicity
/// - `prune` is atomic on its own (savepoint)
pub struct Engine<V> {
    /// Engine configuration
    config: Config,

    /// Owned SQLite connection, opened on first use
    backend: SqliteBackend,

    /// Write-time retention
    retention: RetentionPolicy,

    _value: PhantomData<fn() -> V>,
}

impl<V> Engine<V>
where
    V: Serialize + DeserializeOwned,
{
    /// Create an engine with the given config
    ///
    /// The config is validated here; the database itself is opened on the
    /// first operation.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            backend: SqliteBackend::new(config.clone()),
            retention: RetentionPolicy::new(config.max_entries_per_contract),
            config,
            _value: PhantomData,
        })
    }

    /// Create an in-memory engine (convenience method)
    pub fn in_memory(max_entries_per_contract: usize) -> Result<Self> {
        Self::new(
            Config::builder()
                .in_memory(true)
                .max_entries_per_contract(max_entries_per_contract)
                .build(),
        )
    }

    /// Insert or replace an entry together with its hash and signature
    ///
    /// Same as `put`, except the supplied hash and signature are stored
    /// instead of being cleared.
    pub fn put_signed(
        &self,
        key: &str,
        sort_key: &str,
        value: &V,
        state_hash: Option<&str>,
        signature: Option<&str>,
    ) -> Result<()> {
        self.write(key, sort_key, value, state_hash, signature)
    }

    /// All distinct keys, ascending
    pub fn keys(&self) -> Result<Vec<String>> {
        self.backend.with_connection(|conn| {
            let mut stmt = conn.prepare_cached(SELECT_KEYS_SQL)?;
            let keys = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(keys)
        })
    }

    /// Number of entries across the whole store
    pub fn entry_count(&self) -> Result<u64> {
        self.backend.with_connection(retention::count_entries)
    }

    /// Number of entries for `key`
    pub fn entry_count_for(&self, key: &str) -> Result<u64> {
        self.backend.with_connection(|conn| {
            let count: i64 = conn
                .prepare_cached(COUNT_KEY_SQL)?
                .query_row(params![key], |row| row.get(0))?;
            Ok(count as u64)
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the write-time retention policy
    pub fn retention(&self) -> &RetentionPolicy {
        &self.retention
    }

    /// Whether the database has been opened
    pub fn is_initialized(&self) -> bool {
        self.backend.is_initialized()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Run a single-row entry query
    fn query_entry<P: Params>(&self, sql: &str, params: P) -> Result<Option<Entry<V>>> {
        let row = self.backend.with_connection(|conn| {
            let row = conn
                .prepare_cached(sql)?
                .query_row(params, StoredRow::from_row)
                .optional()?;
            Ok(row)
        })?;

        row.map(StoredRow::decode::<V>).transpose()
    }

    /// Upsert, then evict the key's oldest entries beyond the cap
    fn write(
        &self,
        key: &str,
        sort_key: &str,
        value: &V,
        state_hash: Option<&str>,
        signature: Option<&str>,
    ) -> Result<()> {
        let encoded = codec::encode(value)?;

        self.backend.with_connection(|conn| {
            conn.prepare_cached(UPSERT_SQL)?
                .execute(params![key, sort_key, encoded, state_hash, signature])?;
            self.retention.evict_excess(conn, key)?;
            Ok(())
        })
    }

    fn execute_batch(&self, sql: &str) -> Result<()> {
        self.backend
            .with_connection(|conn| Ok(conn.execute_batch(sql)?))
    }
}

impl<V> SortKeyCache<V> for Engine<V>
where
    V: Serialize + DeserializeOwned,
{
    fn get(&self, key: &str, sort_key: &str) -> Result<Option<Entry<V>>> {
        self.query_entry(SELECT_EXACT_SQL, params![key, sort_key])
    }

    fn get_last(&self, key: &str) -> Result<Option<Entry<V>>> {
        self.query_entry(SELECT_LAST_SQL, params![key])
    }

    fn get_less_or_equal(&self, key: &str, sort_key: &str) -> Result<Option<Entry<V>>> {
        self.query_entry(SELECT_LESS_OR_EQUAL_SQL, params![key, sort_key])
    }

    fn get_less(&self, key: &str, sort_key: &str) -> Result<Option<Entry<V>>> {
        self.query_entry(SELECT_LESS_SQL, params![key, sort_key])
    }

    fn get_last_sort_key(&self) -> Result<Option<String>> {
        self.backend.with_connection(|conn| {
            // MAX over an empty table is a single NULL row
            let sort_key: Option<String> = conn
                .prepare_cached(SELECT_LAST_SORT_KEY_SQL)?
                .query_row([], |row| row.get(0))?;
            Ok(sort_key)
        })
    }

    fn put(&self, key: &str, sort_key: &str, value: &V) -> Result<()> {
        self.write(key, sort_key, value, None, None)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.backend.with_connection(|conn| {
            conn.prepare_cached(DELETE_KEY_SQL)?.execute(params![key])?;
            Ok(())
        })
    }

    fn prune(&self, entries_stored: i64) -> Result<PruneStats> {
        self.backend
            .with_connection(|conn| RetentionPolicy::prune(conn, entries_stored))
    }

    /// A missing `(key, sort_key)` is a silent no-op
    fn set_signature(&self, key: &str, sort_key: &str, hash: &str, signature: &str) -> Result<()> {
        self.backend.with_connection(|conn| {
            let updated = conn
                .prepare_cached(UPDATE_SIGNATURE_SQL)?
                .execute(params![key, sort_key, hash, signature])?;
            if updated == 0 {
                tracing::debug!(key, sort_key, "set_signature matched no entry");
            }
            Ok(())
        })
    }

    fn begin(&self) -> Result<()> {
        self.execute_batch("BEGIN;")
    }

    fn commit(&self) -> Result<()> {
        self.execute_batch("COMMIT;")
    }

    fn rollback(&self) -> Result<()> {
        self.execute_batch("ROLLBACK;")
    }

    /// Initialization is lazy; this only rejects a closed cache
    fn open(&self) -> Result<()> {
        if self.backend.is_closed() {
            return Err(CacheError::Closed);
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.backend.close()
    }
}
