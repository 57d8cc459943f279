//! The record store contract.
//!
//! [`GameStore`] is what the enrichment pipeline and catalog service depend
//! on. [`SqliteGameStore`] implements it over the pooled SQLite document
//! store; tests substitute their own implementations to inject failures.

use psperf_common::{ConsoleVariant, Error, GameId, Platform, Result};
use tracing::debug;

use crate::models::{ConsolePerformance, GameRecord};
use crate::pool::{get_conn, DbPool};
use crate::queries::games;

/// Persistence operations for game records.
///
/// Implementations are synchronous; async callers either call them inline for
/// short reads or move them onto the blocking pool for write-back.
pub trait GameStore: Send + Sync {
    /// Look up a record by id. A missing record is `Ok(None)`.
    fn find_by_id(&self, id: GameId) -> Result<Option<GameRecord>>;

    /// Case-insensitive substring match on title. An empty result is not an
    /// error.
    fn find_by_title(&self, fragment: &str, platform: Option<Platform>)
        -> Result<Vec<GameRecord>>;

    /// Random page of the filtered population, skipping `offset` rows of a
    /// fresh shuffle.
    fn sample_random(
        &self,
        count: u32,
        offset: u32,
        platform: Option<Platform>,
    ) -> Result<Vec<GameRecord>>;

    /// Insert or replace keyed by title. Returns the stored form.
    fn upsert_by_title(&self, record: &GameRecord) -> Result<GameRecord>;

    /// Replace one variant's entry and return the record as stored. Fails
    /// with [`Error::NotFound`] when the id does not exist.
    fn merge_performance(
        &self,
        id: GameId,
        variant: ConsoleVariant,
        entry: &ConsolePerformance,
    ) -> Result<GameRecord>;
}

/// [`GameStore`] backed by an r2d2 SQLite pool.
#[derive(Clone)]
pub struct SqliteGameStore {
    pool: DbPool,
}

impl SqliteGameStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Number of stored records, optionally per platform.
    pub fn count(&self, platform: Option<Platform>) -> Result<u64> {
        let conn = get_conn(&self.pool)?;
        games::count_games(&conn, platform)
    }
}

impl GameStore for SqliteGameStore {
    fn find_by_id(&self, id: GameId) -> Result<Option<GameRecord>> {
        let conn = get_conn(&self.pool)?;
        games::get_game(&conn, id)
    }

    fn find_by_title(
        &self,
        fragment: &str,
        platform: Option<Platform>,
    ) -> Result<Vec<GameRecord>> {
        let conn = get_conn(&self.pool)?;
        games::search_by_title(&conn, fragment, platform)
    }

    fn sample_random(
        &self,
        count: u32,
        offset: u32,
        platform: Option<Platform>,
    ) -> Result<Vec<GameRecord>> {
        let conn = get_conn(&self.pool)?;
        games::sample_random(&conn, count, offset, platform)
    }

    fn upsert_by_title(&self, record: &GameRecord) -> Result<GameRecord> {
        let conn = get_conn(&self.pool)?;
        let stored = games::upsert_by_title(&conn, record)?;
        debug!(title = %stored.title, id = ?stored.id, "Upserted game record");
        Ok(stored)
    }

    fn merge_performance(
        &self,
        id: GameId,
        variant: ConsoleVariant,
        entry: &ConsolePerformance,
    ) -> Result<GameRecord> {
        let mut conn = get_conn(&self.pool)?;
        games::merge_performance(&mut conn, id, variant, entry)?
            .ok_or_else(|| Error::not_found(format!("game {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Performance;
    use crate::pool::{init_memory_pool, init_pool};
    use std::thread;

    fn store() -> SqliteGameStore {
        SqliteGameStore::new(init_memory_pool().unwrap())
    }

    #[test]
    fn merge_on_missing_id_is_not_found_and_store_unchanged() {
        let store = store();
        let stored = store
            .upsert_by_title(&GameRecord::new("[PS5] Returnal", Platform::PlayStation5))
            .unwrap();

        let entry = ConsolePerformance {
            has_graphics_settings: Some(true),
            ..Default::default()
        };
        let err = store
            .merge_performance(GameId::new(), ConsoleVariant::Ps5, &entry)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let reloaded = store.find_by_id(stored.id.unwrap()).unwrap().unwrap();
        assert_eq!(reloaded, stored);
        assert_eq!(store.count(None).unwrap(), 1);
    }

    #[test]
    fn set_variant_a_read_variant_b_unchanged() {
        let store = store();
        let stored = store
            .upsert_by_title(&GameRecord::new("[PS5] Returnal", Platform::PlayStation5))
            .unwrap();
        let id = stored.id.unwrap();

        let pro = ConsolePerformance {
            has_graphics_settings: Some(true),
            performance_mode: Some(Performance::new(60, "1440p")),
            ..Default::default()
        };
        let merged = store
            .merge_performance(id, ConsoleVariant::Ps5Pro, &pro)
            .unwrap();
        assert_eq!(merged.compatible_consoles[&ConsoleVariant::Ps5Pro], pro);

        let reloaded = store.find_by_id(id).unwrap().unwrap();
        assert_eq!(
            reloaded.compatible_consoles[&ConsoleVariant::Ps5],
            stored.compatible_consoles[&ConsoleVariant::Ps5]
        );
        assert_eq!(reloaded.compatible_consoles[&ConsoleVariant::Ps5Pro], pro);
    }

    #[test]
    fn concurrent_sibling_merges_on_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.sqlite");
        let store = SqliteGameStore::new(init_pool(&path.to_string_lossy()).unwrap());
        let id = store
            .upsert_by_title(&GameRecord::new("[PS4] Bloodborne", Platform::PlayStation4))
            .unwrap()
            .id
            .unwrap();

        const ROUNDS: u32 = 50;
        let variants = Platform::PlayStation4.compatible_variants();

        let handles: Vec<_> = variants
            .iter()
            .map(|&variant| {
                let store = store.clone();
                thread::spawn(move || {
                    let mut failures = Vec::new();
                    for fps in 1..=ROUNDS {
                        let entry = ConsolePerformance {
                            has_graphics_settings: Some(false),
                            standard_mode: Some(Performance::new(fps, "1080p")),
                            ..Default::default()
                        };
                        if let Err(e) = store.merge_performance(id, variant, &entry) {
                            failures.push(e.to_string());
                        }
                    }
                    failures
                })
            })
            .collect();

        for handle in handles {
            let failures = handle.join().unwrap();
            assert!(failures.is_empty(), "merge failures: {failures:?}");
        }

        let reloaded = store.find_by_id(id).unwrap().unwrap();
        for variant in variants {
            let fps = reloaded.compatible_consoles[variant]
                .standard_mode
                .as_ref()
                .map(|mode| mode.fps);
            assert_eq!(fps, Some(ROUNDS), "{variant} lost its last write");
        }
    }
}
