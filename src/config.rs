//! Configuration for sortcache
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{CacheError, Result};

/// Per-key cap applied on every write when the caller sets none
pub const DEFAULT_MAX_ENTRIES_PER_CONTRACT: usize = 10;

/// Retention window used by a prune sweep when the operator gives none
pub const DEFAULT_ENTRIES_STORED: i64 = 5;

/// Main configuration for a cache instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the database file. Required unless `in_memory`.
    /// Internal structure:
    ///   {db_location}/
    ///     └── sort_key_cache.db   (SQLite database, WAL journal alongside)
    pub db_location: Option<PathBuf>,

    /// Keep everything in memory; nothing is persisted
    pub in_memory: bool,

    // -------------------------------------------------------------------------
    // Retention Configuration
    // -------------------------------------------------------------------------
    /// Maximum number of entries kept per key after each write
    pub max_entries_per_contract: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_location: None,
            in_memory: false,
            max_entries_per_contract: DEFAULT_MAX_ENTRIES_PER_CONTRACT,
        }
    }
}

impl Config {
    /// Database file name inside `db_location`
    pub const DB_FILENAME: &'static str = "sort_key_cache.db";

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the configuration before a cache is built from it
    pub fn validate(&self) -> Result<()> {
        if !self.in_memory && self.db_location.is_none() {
            return Err(CacheError::Config(
                "db_location is required unless in_memory is set".to_string(),
            ));
        }

        if self.max_entries_per_contract == 0 {
            return Err(CacheError::Config(
                "max_entries_per_contract must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Full path of the database file, `None` for in-memory stores
    pub fn db_path(&self) -> Option<PathBuf> {
        if self.in_memory {
            return None;
        }
        self.db_location
            .as_ref()
            .map(|dir| dir.join(Self::DB_FILENAME))
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the directory that holds the database file
    pub fn db_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.db_location = Some(path.into());
        self
    }

    /// Use an in-memory database instead of a file
    pub fn in_memory(mut self, in_memory: bool) -> Self {
        self.config.in_memory = in_memory;
        self
    }

    /// Set the per-key retention cap applied on every write
    pub fn max_entries_per_contract(mut self, count: usize) -> Self {
        self.config.max_entries_per_contract = count;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
