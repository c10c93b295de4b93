//! Storage Module
//!
//! Adapter over the SQLite storage engine.
//!
//! ## Responsibilities
//! - Open the database lazily, on the first operation
//! - Create the schema and run the one-time compaction on first creation
//! - Own the connection and release it exactly once
//!
//! ## Table Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ sort_key_cache                                              │
//! │ ┌────┬─────┬──────────┬───────┬────────────┬───────────┐   │
//! │ │ id │ key │ sort_key │ value │ state_hash │ signature │   │
//! │ └────┴─────┴──────────┴───────┴────────────┴───────────┘   │
//! │ UNIQUE (key, sort_key)                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod backend;
pub mod schema;

pub use backend::SqliteBackend;
