//! psperf-db: Record store for game performance data
//!
//! This crate persists game records using SQLite with rusqlite and r2d2
//! connection pooling. Records are kept as JSON documents; the engine is
//! only used as a generic document store.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Game record and performance models
//! - `queries` - Raw query operations over a connection
//! - `store` - The [`GameStore`](store::GameStore) contract and its SQLite implementation
//!
//! # Example
//!
//! ```no_run
//! use psperf_common::Platform;
//! use psperf_db::models::GameRecord;
//! use psperf_db::pool::init_pool;
//! use psperf_db::store::{GameStore, SqliteGameStore};
//!
//! let pool = init_pool("/var/lib/psperf/games.sqlite").unwrap();
//! let store = SqliteGameStore::new(pool);
//!
//! let stored = store
//!     .upsert_by_title(&GameRecord::new("[PS5] Astro Bot", Platform::PlayStation5))
//!     .unwrap();
//! println!("Stored: {:?}", stored.id);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
pub mod store;
