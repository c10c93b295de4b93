//! Tests for configuration and the store lifecycle
//!
//! These tests verify:
//! - Configuration defaults and validation
//! - Lazy initialization (directory, schema, compaction)
//! - Close releases the store; later use fails fast
//! - Unsupported operations and corrupted values surface as errors

use rusqlite::Connection;
use serde_json::{json, Value};
use sortcache::{CacheError, Config, Engine, SortKeyCache, DEFAULT_MAX_ENTRIES_PER_CONTRACT};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn file_config(dir: &std::path::Path) -> Config {
    Config::builder().db_location(dir).build()
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_config_defaults() {
    let config = Config::default();

    assert_eq!(config.max_entries_per_contract, DEFAULT_MAX_ENTRIES_PER_CONTRACT);
    assert_eq!(config.max_entries_per_contract, 10);
    assert!(!config.in_memory);
    assert!(config.db_location.is_none());
}

#[test]
fn test_missing_location_is_config_error() {
    let result: Result<Engine<Value>, _> = Engine::new(Config::default());

    assert!(matches!(result, Err(CacheError::Config(_))));
}

#[test]
fn test_zero_cap_is_config_error() {
    let result: Result<Engine<Value>, _> = Engine::in_memory(0);

    assert!(matches!(result, Err(CacheError::Config(_))));
}

#[test]
fn test_in_memory_needs_no_location() {
    let config = Config::builder().in_memory(true).build();

    assert!(config.validate().is_ok());
    assert_eq!(config.db_path(), None);
}

#[test]
fn test_db_path_inside_location() {
    let config = Config::builder().db_location("/tmp/cache").build();

    assert_eq!(
        config.db_path(),
        Some(std::path::PathBuf::from("/tmp/cache").join(Config::DB_FILENAME))
    );
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_initialization_is_lazy() {
    let temp_dir = TempDir::new().unwrap();
    let location = temp_dir.path().join("nested").join("cache");

    let cache: Engine<Value> = Engine::new(file_config(&location)).unwrap();

    assert!(!location.exists());
    assert!(!cache.is_initialized());

    // open is a placeholder; the first real operation initializes
    cache.open().unwrap();
    assert!(!cache.is_initialized());

    assert!(cache.get_last("A").unwrap().is_none());
    assert!(cache.is_initialized());
    assert!(location.join(Config::DB_FILENAME).exists());
}

#[test]
fn test_first_creation_enables_auto_vacuum() {
    let temp_dir = TempDir::new().unwrap();

    let cache: Engine<Value> = Engine::new(file_config(temp_dir.path())).unwrap();
    cache.put("A", "0001", &json!(1)).unwrap();
    cache.close().unwrap();

    let conn = Connection::open(temp_dir.path().join(Config::DB_FILENAME)).unwrap();
    let auto_vacuum: i64 = conn
        .query_row("PRAGMA auto_vacuum", [], |row| row.get(0))
        .unwrap();
    // 1 = FULL
    assert_eq!(auto_vacuum, 1);
}

#[test]
fn test_reopen_existing_store() {
    let temp_dir = TempDir::new().unwrap();

    {
        let cache: Engine<Value> = Engine::new(file_config(temp_dir.path())).unwrap();
        cache.put("A", "0001", &json!(1)).unwrap();
        cache.close().unwrap();
    }

    let cache: Engine<Value> = Engine::new(file_config(temp_dir.path())).unwrap();
    cache.put("A", "0002", &json!(2)).unwrap();

    assert_eq!(cache.entry_count().unwrap(), 2);
}

// =============================================================================
// Close Tests
// =============================================================================

#[test]
fn test_operations_after_close_fail() {
    let cache: Engine<Value> = Engine::in_memory(10).unwrap();

    cache.put("A", "0001", &json!(1)).unwrap();
    cache.close().unwrap();

    assert!(!cache.is_initialized());
    assert!(matches!(cache.get_last("A"), Err(CacheError::Closed)));
    assert!(matches!(cache.put("A", "0002", &json!(2)), Err(CacheError::Closed)));
    assert!(matches!(cache.prune(1), Err(CacheError::Closed)));
    assert!(matches!(cache.begin(), Err(CacheError::Closed)));
    assert!(matches!(cache.open(), Err(CacheError::Closed)));
}

#[test]
fn test_close_before_first_use() {
    let cache: Engine<Value> = Engine::in_memory(10).unwrap();

    cache.close().unwrap();

    assert!(matches!(cache.get("A", "0001"), Err(CacheError::Closed)));
}

#[test]
fn test_close_twice_is_noop() {
    let cache: Engine<Value> = Engine::in_memory(10).unwrap();

    cache.put("A", "0001", &json!(1)).unwrap();
    cache.close().unwrap();
    cache.close().unwrap();
}

#[test]
fn test_in_memory_store_is_not_shared() {
    let first: Engine<Value> = Engine::in_memory(10).unwrap();
    first.put("A", "0001", &json!(1)).unwrap();
    first.close().unwrap();

    let second: Engine<Value> = Engine::in_memory(10).unwrap();
    assert!(second.get_last("A").unwrap().is_none());
}

// =============================================================================
// Error Surface Tests
// =============================================================================

#[test]
fn test_dump_is_unsupported() {
    let cache: Engine<Value> = Engine::in_memory(10).unwrap();

    assert!(matches!(cache.dump(), Err(CacheError::Unsupported("dump"))));
}

#[test]
fn test_corrupted_value_is_serialization_error() {
    let temp_dir = TempDir::new().unwrap();

    let cache: Engine<Value> = Engine::new(file_config(temp_dir.path())).unwrap();
    cache.put("A", "0001", &json!({ "v": 1 })).unwrap();
    cache.close().unwrap();

    {
        let conn = Connection::open(temp_dir.path().join(Config::DB_FILENAME)).unwrap();
        conn.execute(
            "UPDATE sort_key_cache SET value = 'not json' WHERE key = 'A'",
            [],
        )
        .unwrap();
    }

    let cache: Engine<Value> = Engine::new(file_config(temp_dir.path())).unwrap();
    assert!(matches!(
        cache.get("A", "0001"),
        Err(CacheError::Serialization(_))
    ));
}

#[test]
fn test_backend_error_propagates() {
    let cache: Engine<Value> = Engine::in_memory(10).unwrap();

    assert!(matches!(cache.rollback(), Err(CacheError::Sqlite(_))));
}
