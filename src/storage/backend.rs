//! SQLite Backend
//!
//! Owns the single connection of a cache and its lifecycle.
//!
//! ## Lifecycle
//! ```text
//! Uninitialized ──first use──▶ Open ──close──▶ Closed
//!       └──────────────────close─────────────────┘
//! ```
//! Any use after `close` fails with `CacheError::Closed`.

use std::fs;

use parking_lot::Mutex;
use rusqlite::Connection;

use crate::config::Config;
use crate::error::{CacheError, Result};

use super::schema;

/// Connection state
enum BackendState {
    /// Nothing opened yet; the next operation connects
    Uninitialized,

    /// Connection ready for statements
    Open(Connection),

    /// Released by `close`; terminal
    Closed,
}

/// Lazily-opened SQLite connection
///
/// ## Concurrency:
/// - `state`: Mutex serializes every statement on the connection
/// - Compound operations run under one lock acquisition
pub struct SqliteBackend {
    /// Where and how to open the database
    config: Config,

    /// Current lifecycle state
    state: Mutex<BackendState>,
}

impl SqliteBackend {
    /// Create a backend; no file is touched until first use
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: Mutex::new(BackendState::Uninitialized),
        }
    }

    /// Run `f` against the open connection, connecting first if needed
    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let mut state = self.state.lock();

        if matches!(*state, BackendState::Uninitialized) {
            *state = BackendState::Open(self.connect()?);
        }

        match &*state {
            BackendState::Open(conn) => f(conn),
            _ => Err(CacheError::Closed),
        }
    }

    /// Release the connection
    ///
    /// Closing twice is a no-op. A failed close still leaves the backend
    /// closed; the connection is dropped.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock();

        if let BackendState::Open(conn) = std::mem::replace(&mut *state, BackendState::Closed) {
            conn.close().map_err(|(_, e)| CacheError::from(e))?;
            tracing::info!("sort key cache closed");
        }

        Ok(())
    }

    /// Whether a connection has been opened and not yet closed
    pub fn is_initialized(&self) -> bool {
        matches!(*self.state.lock(), BackendState::Open(_))
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        matches!(*self.state.lock(), BackendState::Closed)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Open the connection and make sure the schema exists
    ///
    /// Steps:
    /// 1. Create the storage directory (file-backed only)
    /// 2. Open the database file, or an in-memory database
    /// 3. Create the table on first creation (with compaction)
    /// 4. Switch file-backed stores to WAL journaling
    fn connect(&self) -> Result<Connection> {
        let conn = match self.config.db_path() {
            Some(path) => {
                if let Some(dir) = &self.config.db_location {
                    fs::create_dir_all(dir)?;
                }
                Connection::open(&path)?
            }
            None if self.config.in_memory => Connection::open_in_memory()?,
            None => {
                return Err(CacheError::Config(
                    "db_location is required unless in_memory is set".to_string(),
                ))
            }
        };

        let persistent = !self.config.in_memory;
        let created = schema::initialize(&conn, persistent)?;

        if persistent {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }

        tracing::info!(
            location = ?self.config.db_path(),
            in_memory = self.config.in_memory,
            created,
            "sort key cache initialized"
        );

        Ok(conn)
    }
}
