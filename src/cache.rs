//! Sort Key Cache capability
//!
//! The ordered-cache contract offered to the surrounding system: versioned
//! storage of opaque values, addressed by key and ordered by sort key.

use crate::entry::{Entry, PruneStats};
use crate::error::{CacheError, Result};

/// Versioned-by-sort-key storage for values of type `V`
///
/// Sort keys compare as plain strings; callers build them so that string
/// order is chronological order.
pub trait SortKeyCache<V> {
    /// Exact match on `(key, sort_key)`
    fn get(&self, key: &str, sort_key: &str) -> Result<Option<Entry<V>>>;

    /// Entry with the greatest sort key for `key`
    fn get_last(&self, key: &str) -> Result<Option<Entry<V>>>;

    /// Entry with the greatest sort key `<= sort_key` for `key`
    fn get_less_or_equal(&self, key: &str, sort_key: &str) -> Result<Option<Entry<V>>>;

    /// Entry with the greatest sort key `< sort_key` for `key`
    fn get_less(&self, key: &str, sort_key: &str) -> Result<Option<Entry<V>>>;

    /// Greatest sort key across the whole store, not scoped to one key
    fn get_last_sort_key(&self) -> Result<Option<String>>;

    /// Insert or replace the entry, then apply per-key retention
    fn put(&self, key: &str, sort_key: &str, value: &V) -> Result<()>;

    /// Remove every entry for `key`
    fn delete(&self, key: &str) -> Result<()>;

    /// Keep only the `entries_stored` newest entries of every key
    ///
    /// Values below 1 are treated as 1.
    fn prune(&self, entries_stored: i64) -> Result<PruneStats>;

    /// Attach a state hash and signature to an existing entry
    fn set_signature(&self, key: &str, sort_key: &str, hash: &str, signature: &str) -> Result<()>;

    fn begin(&self) -> Result<()>;

    fn commit(&self) -> Result<()>;

    fn rollback(&self) -> Result<()>;

    fn open(&self) -> Result<()>;

    fn close(&self) -> Result<()>;

    /// Export the whole store. Not supported.
    fn dump(&self) -> Result<Vec<Entry<V>>> {
        Err(CacheError::Unsupported("dump"))
    }
}
