//! sortcache CLI
//!
//! Command-line interface for inspecting and maintaining a cache directory.

use clap::{Parser, Subcommand};
use serde_json::Value;
use sortcache::{codec, Config, Engine, Entry, SortKeyCache, DEFAULT_ENTRIES_STORED};
use tracing_subscriber::{fmt, EnvFilter};

/// sortcache CLI
#[derive(Parser, Debug)]
#[command(name = "sortcache-cli")]
#[command(about = "CLI for the sortcache versioned key-value cache")]
#[command(version)]
struct Args {
    /// Directory holding the cache database
    #[arg(short, long, default_value = "./sortcache_data")]
    db_location: String,

    /// Per-key retention cap applied on writes
    #[arg(short, long, default_value_t = sortcache::DEFAULT_MAX_ENTRIES_PER_CONTRACT)]
    max_entries: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get the entry at an exact sort key
    Get { key: String, sort_key: String },

    /// Get the newest entry of a key
    Last { key: String },

    /// Get the newest entry at or below a sort key
    Le { key: String, sort_key: String },

    /// Get the newest entry strictly below a sort key
    Lt { key: String, sort_key: String },

    /// Print the greatest sort key in the whole store
    LastSortKey,

    /// Store a JSON value
    Put {
        key: String,
        sort_key: String,

        /// The value, as JSON text
        value: String,
    },

    /// Delete every entry of a key
    Delete { key: String },

    /// Keep only the newest entries of every key
    Prune {
        #[arg(short, long, default_value_t = DEFAULT_ENTRIES_STORED, allow_negative_numbers = true)]
        entries_stored: i64,
    },

    /// Hash a stored entry and attach a signature to it
    Sign {
        key: String,
        sort_key: String,
        signature: String,
    },

    /// List all keys
    Keys,

    /// Print entry counts
    Stats,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sortcache=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .db_location(&args.db_location)
        .max_entries_per_contract(args.max_entries)
        .build();

    let cache: Engine<Value> = match Engine::new(config) {
        Ok(cache) => cache,
        Err(e) => {
            tracing::error!("Failed to create cache: {}", e);
            std::process::exit(1);
        }
    };

    let outcome = run(&cache, args.command);
    let closed = cache.close();

    if let Err(e) = outcome.and(closed) {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

/// Execute one command and print its result as JSON
fn run(cache: &Engine<Value>, command: Commands) -> sortcache::Result<()> {
    match command {
        Commands::Get { key, sort_key } => print_entry(cache.get(&key, &sort_key)?),
        Commands::Last { key } => print_entry(cache.get_last(&key)?),
        Commands::Le { key, sort_key } => print_entry(cache.get_less_or_equal(&key, &sort_key)?),
        Commands::Lt { key, sort_key } => print_entry(cache.get_less(&key, &sort_key)?),
        Commands::LastSortKey => print_json(&cache.get_last_sort_key()?),
        Commands::Put { key, sort_key, value } => {
            let value: Value = serde_json::from_str(&value)?;
            cache.put(&key, &sort_key, &value)?;
            tracing::info!(key = %key, sort_key = %sort_key, "stored entry");
            Ok(())
        }
        Commands::Delete { key } => {
            cache.delete(&key)?;
            tracing::info!(key = %key, "deleted entries");
            Ok(())
        }
        Commands::Prune { entries_stored } => print_json(&cache.prune(entries_stored)?),
        Commands::Sign {
            key,
            sort_key,
            signature,
        } => {
            let Some(entry) = cache.get(&key, &sort_key)? else {
                tracing::warn!(key = %key, sort_key = %sort_key, "no such entry");
                return Ok(());
            };
            let hash = codec::state_hash(&entry.value)?;
            cache.set_signature(&key, &sort_key, &hash, &signature)?;
            print_json(&hash)
        }
        Commands::Keys => print_json(&cache.keys()?),
        Commands::Stats => {
            let mut per_key = serde_json::Map::new();
            for key in cache.keys()? {
                let count = cache.entry_count_for(&key)?;
                per_key.insert(key, Value::from(count));
            }
            print_json(&serde_json::json!({
                "entries": cache.entry_count()?,
                "keys": per_key,
            }))
        }
    }
}

fn print_entry(entry: Option<Entry<Value>>) -> sortcache::Result<()> {
    print_json(&entry)
}

fn print_json<T: serde::Serialize>(value: &T) -> sortcache::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
