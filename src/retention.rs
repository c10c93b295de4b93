//! Retention Policy
//!
//! Decides which versions of a key survive.
//!
//! ## Two independent knobs
//! - `max_entries_per_contract`: applied after every write, to the written key
//! - `entries_stored`: given per call to a store-wide prune sweep
//!
//! Both rank a key's entries by `sort_key` descending and delete the tail.

use rusqlite::{params, Connection};

use crate::entry::PruneStats;
use crate::error::Result;

/// Keeps the `?2` newest entries of key `?1`
const EVICT_KEY_SQL: &str = "
    DELETE FROM sort_key_cache WHERE id IN (
        SELECT id FROM (
            SELECT id, ROW_NUMBER() OVER (ORDER BY sort_key DESC) AS entry_rank
            FROM sort_key_cache
            WHERE key = ?1
        ) WHERE entry_rank > ?2
    )
";

/// Keeps the `?1` newest entries of every key
const PRUNE_SQL: &str = "
    DELETE FROM sort_key_cache WHERE id IN (
        SELECT id FROM (
            SELECT id, ROW_NUMBER() OVER (PARTITION BY key ORDER BY sort_key DESC) AS entry_rank
            FROM sort_key_cache
        ) WHERE entry_rank > ?1
    )
";

const COUNT_SQL: &str = "SELECT COUNT(*) FROM sort_key_cache";

/// Write-time retention settings
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    max_entries_per_contract: usize,
}

impl RetentionPolicy {
    pub fn new(max_entries_per_contract: usize) -> Self {
        Self {
            max_entries_per_contract: max_entries_per_contract.max(1),
        }
    }

    /// Per-key cap applied after every write
    pub fn max_entries_per_contract(&self) -> usize {
        self.max_entries_per_contract
    }

    /// Clamp a prune window to at least one entry per key
    pub fn clamp_entries_stored(entries_stored: i64) -> i64 {
        entries_stored.max(1)
    }

    /// Enforce the per-key cap after a write to `key`
    ///
    /// Ranks the whole key after the upsert, so a write older than every
    /// retained entry is evicted straight away. Returns the evicted count.
    pub(crate) fn evict_excess(&self, conn: &Connection, key: &str) -> Result<usize> {
        let cap = i64::try_from(self.max_entries_per_contract).unwrap_or(i64::MAX);
        let evicted = conn
            .prepare_cached(EVICT_KEY_SQL)?
            .execute(params![key, cap])?;

        if evicted > 0 {
            tracing::debug!(key, evicted, cap, "evicted old entries");
        }

        Ok(evicted)
    }

    /// Keep only the `entries_stored` newest entries of every key
    ///
    /// Counting and deleting run inside one savepoint, so the sweep is
    /// atomic with or without an enclosing transaction.
    pub(crate) fn prune(conn: &Connection, entries_stored: i64) -> Result<PruneStats> {
        let keep = Self::clamp_entries_stored(entries_stored);

        conn.execute_batch("SAVEPOINT prune;")?;
        let outcome = Self::sweep(conn, keep).and_then(|stats| {
            conn.execute_batch("RELEASE prune;")?;
            Ok(stats)
        });

        // Any failure, including RELEASE itself, must not leave the savepoint open
        match outcome {
            Ok(stats) => {
                tracing::info!(
                    keep,
                    entries_before = stats.entries_before,
                    entries_after = stats.entries_after,
                    "pruned sort key cache"
                );
                Ok(stats)
            }
            Err(e) => {
                if let Err(rollback) = conn.execute_batch("ROLLBACK TO prune; RELEASE prune;") {
                    tracing::error!(error = %rollback, "failed to roll back prune");
                }
                Err(e)
            }
        }
    }

    fn sweep(conn: &Connection, keep: i64) -> Result<PruneStats> {
        let entries_before = count_entries(conn)?;
        conn.prepare_cached(PRUNE_SQL)?.execute(params![keep])?;
        let entries_after = count_entries(conn)?;

        Ok(PruneStats {
            entries_before,
            entries_after,
            size_before: None,
            size_after: None,
        })
    }
}

/// Number of entries across the whole store
pub(crate) fn count_entries(conn: &Connection) -> Result<u64> {
    let count: i64 = conn
        .prepare_cached(COUNT_SQL)?
        .query_row([], |row| row.get(0))?;
    Ok(count as u64)
}
