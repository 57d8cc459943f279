//! Database connection pool management.
//!
//! Connection pooling for SQLite using r2d2. Opening a pool also brings the
//! schema up to date.

use std::time::Duration;

use psperf_common::{Error, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Connections per file-backed pool.
const POOL_SIZE: u32 = 4;

/// How long a request waits for a free connection before the store is
/// reported unavailable.
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Initialize a new database pool with the given file path.
///
/// Creates the SQLite file if needed, switches it to WAL so readers do not
/// block the write-back path, and runs pending migrations.
///
/// # Example
///
/// ```no_run
/// use psperf_db::pool::init_pool;
///
/// let pool = init_pool("/var/lib/psperf/games.sqlite").unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.busy_timeout(CONNECTION_TIMEOUT)?;
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
    });

    build(manager, POOL_SIZE)
}

/// Initialize an in-memory database pool for testing.
///
/// Every SQLite in-memory connection is its own database, so the pool is
/// capped at a single connection to keep all callers on the same data.
///
/// ```
/// use psperf_db::pool::init_memory_pool;
///
/// let pool = init_memory_pool().unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_memory_pool() -> Result<DbPool> {
    build(SqliteConnectionManager::memory(), 1)
}

fn build(manager: SqliteConnectionManager, max_size: u32) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(max_size)
        .connection_timeout(CONNECTION_TIMEOUT)
        .build(manager)
        .map_err(|e| Error::storage(format!("Failed to create connection pool: {}", e)))?;

    let mut conn = get_conn(&pool)?;
    migrations::run_migrations(&mut conn)
        .map_err(|e| Error::storage(format!("Failed to run migrations: {}", e)))?;

    Ok(pool)
}

/// Get a connection from the pool.
///
/// Converts the r2d2 error into [`Error::StorageUnavailable`].
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::storage(format!("Failed to get connection from pool: {}", e)))
}
