//! Embedded schema migrations.
//!
//! The applied version is kept in SQLite's `user_version` header field, so a
//! fresh file reports 0 and each script in [`SCRIPTS`] moves it up by one.

use rusqlite::{Connection, TransactionBehavior};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration to version {version} failed: {source}")]
    Script {
        version: u32,
        #[source]
        source: rusqlite::Error,
    },
}

/// Schema scripts, in version order. Version N is `SCRIPTS[N - 1]`.
const SCRIPTS: &[&str] = &[include_str!("001_initial.sql")];

fn user_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}

/// Bring the schema up to date. Returns how many scripts were applied.
///
/// All pending scripts run in one immediate transaction, so two processes
/// opening the same file at once cannot both apply them.
pub fn run_migrations(conn: &mut Connection) -> Result<usize, MigrationError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let current = user_version(&tx)? as usize;

    let mut applied = 0;
    for (index, sql) in SCRIPTS.iter().enumerate().skip(current) {
        let version = index as u32 + 1;
        tx.execute_batch(sql)
            .and_then(|_| tx.pragma_update(None, "user_version", version))
            .map_err(|source| MigrationError::Script { version, source })?;
        info!(version, "Applied schema migration");
        applied += 1;
    }

    tx.commit()?;
    Ok(applied)
}
