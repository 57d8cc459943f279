//! Enrichment pipeline: local lookup with provider fallback.
//!
//! The [`EnrichmentPipeline`] answers title queries from the record store when
//! it can and otherwise asks the metadata provider, turning each provider game
//! into one local record per console family it was released on. Synthesized
//! records are written back to the store on a best-effort basis.

use std::sync::Arc;

use psperf_common::{Platform, Result};
use psperf_db::models::GameRecord;
use psperf_db::store::GameStore;
use serde::{Deserialize, Serialize};
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use super::provider::{GameMetadataProvider, ProviderGame};

/// How synthesized records are persisted relative to the response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteBackMode {
    /// Respond immediately; upserts run on the blocking pool afterwards.
    #[default]
    Detached,
    /// Wait for the upserts and return the stored records (with ids).
    Awaited,
}

/// Build the local records for a batch of provider games.
///
/// A game released on both families yields two records that differ only in
/// their tag prefix and variant set. Games on neither family are dropped, as
/// is any family excluded by `filter`.
pub fn synthesize(games: &[ProviderGame], filter: Option<Platform>) -> Vec<GameRecord> {
    let mut records = Vec::new();

    for game in games {
        for platform in Platform::ALL {
            if filter.is_some_and(|f| f != platform) {
                continue;
            }
            let released = game
                .platforms
                .iter()
                .any(|name| Platform::from_provider_name(name) == Some(platform));
            if !released {
                continue;
            }

            let mut record = GameRecord::new(format!("[{}] {}", platform.tag(), game.name), platform);
            record.cover_art_url = game.cover_url.clone();
            record.release_year = game.release_year();
            record.provider_id = Some(game.id);
            records.push(record);
        }
    }

    records
}

/// Orchestrates store lookups, provider fallback and write-back.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = EnrichmentPipeline::new(store, provider, WriteBackMode::Detached);
/// let games = pipeline.lookup("Spider-Man", None).await?;
/// ```
pub struct EnrichmentPipeline {
    store: Arc<dyn GameStore>,
    provider: Arc<dyn GameMetadataProvider>,
    mode: WriteBackMode,
    writes: TaskTracker,
    /// Serializes `settle` so one caller cannot reopen the tracker while
    /// another is still waiting on it.
    settling: tokio::sync::Mutex<()>,
}

impl EnrichmentPipeline {
    pub fn new(
        store: Arc<dyn GameStore>,
        provider: Arc<dyn GameMetadataProvider>,
        mode: WriteBackMode,
    ) -> Self {
        Self {
            store,
            provider,
            mode,
            writes: TaskTracker::new(),
            settling: tokio::sync::Mutex::new(()),
        }
    }

    /// Resolve a title query.
    ///
    /// 1. Any local match is returned as-is and the provider is not called.
    /// 2. Otherwise the provider is searched and its games are split per
    ///    family, filtered and written back.
    ///
    /// A store failure on the local read falls through to the provider. A
    /// provider failure is returned to the caller.
    pub async fn lookup(&self, query: &str, filter: Option<Platform>) -> Result<Vec<GameRecord>> {
        match self.store.find_by_title(query, filter) {
            Ok(local) if !local.is_empty() => {
                debug!(query, count = local.len(), "Answered from local store");
                return Ok(local);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(query, error = %e, "Local title search failed; asking provider");
            }
        }

        let games = self.provider.search(query).await?;
        let records = synthesize(&games, filter);
        info!(
            query,
            provider = self.provider.name(),
            provider_games = games.len(),
            records = records.len(),
            "Enriched title query from provider"
        );

        Ok(self.write_back(records).await)
    }

    /// Pull a random batch from the provider and turn it into at most `count`
    /// local records, written back like search results.
    pub async fn sample(&self, count: u32, filter: Option<Platform>) -> Result<Vec<GameRecord>> {
        let games = self.provider.random_sample(count).await?;
        let mut records = synthesize(&games, filter);
        records.truncate(count as usize);
        debug!(
            provider_games = games.len(),
            records = records.len(),
            "Sampled games from provider"
        );

        Ok(self.write_back(records).await)
    }

    /// Persist synthesized records. Failures are logged and never surface.
    async fn write_back(&self, records: Vec<GameRecord>) -> Vec<GameRecord> {
        if records.is_empty() {
            return records;
        }

        let store = Arc::clone(&self.store);

        match self.mode {
            WriteBackMode::Detached => {
                let pending = records.clone();
                self.writes.spawn_blocking(move || {
                    for record in &pending {
                        upsert_logged(store.as_ref(), record);
                    }
                });
                records
            }
            WriteBackMode::Awaited => {
                let fallback = records.clone();
                let handle = self.writes.spawn_blocking(move || {
                    records
                        .into_iter()
                        .map(|record| upsert_logged(store.as_ref(), &record).unwrap_or(record))
                        .collect::<Vec<_>>()
                });
                match handle.await {
                    Ok(stored) => stored,
                    Err(e) => {
                        warn!(error = %e, "Write-back task failed");
                        fallback
                    }
                }
            }
        }
    }

    /// Wait for every write-back started so far to finish.
    pub async fn settle(&self) {
        let _guard = self.settling.lock().await;
        self.writes.close();
        self.writes.wait().await;
        self.writes.reopen();
    }
}

fn upsert_logged(store: &dyn GameStore, record: &GameRecord) -> Option<GameRecord> {
    match store.upsert_by_title(record) {
        Ok(stored) => Some(stored),
        Err(e) => {
            warn!(title = %record.title, error = %e, "Write-back failed");
            None
        }
    }
}
