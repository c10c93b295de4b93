//! # sortcache
//!
//! An embedded, persistent, versioned key-value cache with:
//! - Multiple time-ordered versions ("sort keys") per logical key
//! - Exact, latest, less-or-equal and strictly-less lookups
//! - Bounded retention per key on every write, plus a store-wide prune
//! - Canonical JSON values with optional state hashes and signatures
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  SortKeyCache<V> (trait)                     │
//! │        get / get_last / get_less_or_equal / put / prune      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine<V>                              │
//! │              (single owned connection)                       │
//! └──────┬──────────────────────┬──────────────────────┬────────┘
//!        │                      │                      │
//!        ▼                      ▼                      ▼
//! ┌─────────────┐       ┌───────────────┐      ┌─────────────┐
//! │ Value Codec │       │   Retention   │      │   Storage   │
//! │   (JSON)    │       │    Policy     │      │  (SQLite)   │
//! └─────────────┘       └───────────────┘      └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use serde_json::{json, Value};
//! use sortcache::{Config, Engine, SortKeyCache};
//!
//! let cache: Engine<Value> = Engine::new(
//!     Config::builder()
//!         .db_location("./cache")
//!         .max_entries_per_contract(10)
//!         .build(),
//! )?;
//!
//! cache.put("contract-1", "000000000001", &json!({ "balance": 10 }))?;
//! let last = cache.get_last("contract-1")?;
//! assert_eq!(last.map(|e| e.sort_key), Some("000000000001".to_string()));
//! # Ok::<(), sortcache::CacheError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod entry;
pub mod retention;
pub mod storage;
pub mod cache;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CacheError, Result};
pub use config::{Config, DEFAULT_ENTRIES_STORED, DEFAULT_MAX_ENTRIES_PER_CONTRACT};
pub use cache::SortKeyCache;
pub use entry::{Entry, PruneStats};
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of sortcache
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
