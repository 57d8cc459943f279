//! Game record queries.
//!
//! Each row holds the full record as a JSON document plus a handful of
//! columns used for lookups. The title column is the natural key for upserts.

use chrono::Utc;
use psperf_common::{ConsoleVariant, Error, GameId, Platform, Result};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use uuid::Uuid;

use crate::models::{ConsolePerformance, GameRecord};

fn storage_err(e: rusqlite::Error) -> Error {
    Error::storage(e.to_string())
}

fn encode(record: &GameRecord) -> Result<String> {
    // The id lives in its own column; keep it out of the document.
    let mut doc = record.clone();
    doc.id = None;
    serde_json::to_string(&doc).map_err(|e| Error::internal(e.to_string()))
}

fn decode(id: &str, document: &str) -> Result<GameRecord> {
    let uuid = Uuid::parse_str(id)
        .map_err(|e| Error::storage(format!("corrupt id column {id:?}: {e}")))?;
    let mut record: GameRecord = serde_json::from_str(document)
        .map_err(|e| Error::storage(format!("corrupt document for {id}: {e}")))?;
    record.id = Some(GameId::from(uuid));
    record.normalize_variants();
    Ok(record)
}

fn collect_rows(
    stmt: &mut rusqlite::Statement<'_>,
    params: impl rusqlite::Params,
) -> Result<Vec<GameRecord>> {
    let rows = stmt
        .query_map(params, |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(storage_err)?;

    let mut records = Vec::new();
    for row in rows {
        let (id, document) = row.map_err(storage_err)?;
        records.push(decode(&id, &document)?);
    }
    Ok(records)
}

/// Insert a record, or replace the document of the record with the same title.
///
/// The stored id is kept on conflict, so a title keeps its identity across
/// re-enrichment. Returns the record as stored.
pub fn upsert_by_title(conn: &Connection, record: &GameRecord) -> Result<GameRecord> {
    let document = encode(record)?;
    let now = Utc::now().to_rfc3339();
    let new_id = record.id.unwrap_or_default();

    conn.execute(
        "INSERT INTO games (id, title, platform, provider_id, document, created_at, updated_at)
         VALUES (:id, :title, :platform, :provider_id, :document, :now, :now)
         ON CONFLICT(title) DO UPDATE SET
            platform = excluded.platform,
            provider_id = excluded.provider_id,
            document = excluded.document,
            updated_at = excluded.updated_at",
        rusqlite::named_params! {
            ":id": new_id.to_string(),
            ":title": &record.title,
            ":platform": record.platform.name(),
            ":provider_id": record.provider_id.map(|id| id as i64),
            ":document": document,
            ":now": now,
        },
    )
    .map_err(storage_err)?;

    get_by_title(conn, &record.title)?
        .ok_or_else(|| Error::storage(format!("record vanished after upsert: {}", record.title)))
}

/// Get a record by exact title.
pub fn get_by_title(conn: &Connection, title: &str) -> Result<Option<GameRecord>> {
    conn.query_row(
        "SELECT id, document FROM games WHERE title = ?1",
        [title],
        |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
    )
    .optional()
    .map_err(storage_err)?
    .map(|(id, doc)| decode(&id, &doc))
    .transpose()
}

/// Get a record by id. A missing record is `Ok(None)`.
pub fn get_game(conn: &Connection, id: GameId) -> Result<Option<GameRecord>> {
    conn.query_row(
        "SELECT id, document FROM games WHERE id = ?1",
        [id.to_string()],
        |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
    )
    .optional()
    .map_err(storage_err)?
    .map(|(id, doc)| decode(&id, &doc))
    .transpose()
}

/// Case-insensitive substring search on title, optionally restricted to one
/// platform. Results are ordered by title.
pub fn search_by_title(
    conn: &Connection,
    fragment: &str,
    platform: Option<Platform>,
) -> Result<Vec<GameRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, document FROM games
             WHERE instr(lower(title), lower(:fragment)) > 0
               AND (:platform IS NULL OR platform = :platform)
             ORDER BY title",
        )
        .map_err(storage_err)?;

    collect_rows(
        &mut stmt,
        rusqlite::named_params! {
            ":fragment": fragment,
            ":platform": platform.map(|p| p.name()),
        },
    )
}

/// Draw a random page from the (optionally filtered) population.
///
/// The population is shuffled on every call and `offset` rows are skipped,
/// so consecutive pages are independent draws and may overlap.
pub fn sample_random(
    conn: &Connection,
    count: u32,
    offset: u32,
    platform: Option<Platform>,
) -> Result<Vec<GameRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, document FROM games
             WHERE (:platform IS NULL OR platform = :platform)
             ORDER BY RANDOM()
             LIMIT :limit OFFSET :offset",
        )
        .map_err(storage_err)?;

    collect_rows(
        &mut stmt,
        rusqlite::named_params! {
            ":platform": platform.map(|p| p.name()),
            ":limit": count,
            ":offset": offset,
        },
    )
}

/// Count records, optionally restricted to one platform.
pub fn count_games(conn: &Connection, platform: Option<Platform>) -> Result<u64> {
    conn.query_row(
        "SELECT COUNT(*) FROM games WHERE (?1 IS NULL OR platform = ?1)",
        [platform.map(|p| p.name())],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n as u64)
    .map_err(storage_err)
}

/// Replace the performance entry of one console variant.
///
/// The write lock is taken before the read, so concurrent merges of sibling
/// variants queue on the busy timeout instead of failing or overwriting each
/// other. Returns the stored record, or `Ok(None)` when the id does not exist.
pub fn merge_performance(
    conn: &mut Connection,
    id: GameId,
    variant: ConsoleVariant,
    entry: &ConsolePerformance,
) -> Result<Option<GameRecord>> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(storage_err)?;

    let Some(mut record) = get_game(&tx, id)? else {
        return Ok(None);
    };
    record.merge_performance(variant, entry.clone())?;

    tx.execute(
        "UPDATE games SET document = ?1, updated_at = ?2 WHERE id = ?3",
        rusqlite::params![encode(&record)?, Utc::now().to_rfc3339(), id.to_string()],
    )
    .map_err(storage_err)?;

    tx.commit().map_err(storage_err)?;
    Ok(Some(record))
}
