//! Entry definitions
//!
//! Defines the records returned by the cache and the stats of a prune sweep.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::Result;

/// A single versioned record: one value of `key` at `sort_key`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<V> {
    /// Logical key (e.g. a contract address)
    pub key: String,

    /// Version identifier; string order is chronological order
    pub sort_key: String,

    /// The cached value
    pub value: V,

    /// Content fingerprint of `value`, set by a signer
    pub state_hash: Option<String>,

    /// Authentication tag over `state_hash`
    pub signature: Option<String>,
}

/// Outcome of a store-wide prune sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PruneStats {
    /// Entries in the store before the sweep
    pub entries_before: u64,

    /// Entries in the store after the sweep
    pub entries_after: u64,

    /// Size accounting is not supported; always `None`
    pub size_before: Option<u64>,

    /// Size accounting is not supported; always `None`
    pub size_after: Option<u64>,
}

impl PruneStats {
    /// Number of entries the sweep removed
    pub fn removed(&self) -> u64 {
        self.entries_before - self.entries_after
    }
}

/// A row as read from `sort_key_cache`, value still encoded
#[derive(Debug)]
pub(crate) struct StoredRow {
    pub key: String,
    pub sort_key: String,
    pub value: String,
    pub state_hash: Option<String>,
    pub signature: Option<String>,
}

impl StoredRow {
    /// Map a row selected as `key, sort_key, value, state_hash, signature`
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            key: row.get(0)?,
            sort_key: row.get(1)?,
            value: row.get(2)?,
            state_hash: row.get(3)?,
            signature: row.get(4)?,
        })
    }

    /// Decode the stored value; malformed text is an error
    pub fn decode<V: DeserializeOwned>(self) -> Result<Entry<V>> {
        Ok(Entry {
            value: codec::decode(&self.value)?,
            key: self.key,
            sort_key: self.sort_key,
            state_hash: self.state_hash,
            signature: self.signature,
        })
    }
}
