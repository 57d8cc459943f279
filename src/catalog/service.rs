//! Catalog service.
//!
//! [`CatalogService`] owns the record store handle, the enrichment pipeline
//! and the random-games cache together with the ticker that clears it.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use psperf_common::{ConsoleVariant, Error, GameId, Platform, Result};
use psperf_db::models::{ConsolePerformance, GameRecord};
use psperf_db::store::GameStore;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::cache::{start_clear_task, RandomSampleCache};
use crate::config::Config;
use crate::metadata::{EnrichmentPipeline, GameMetadataProvider, WriteBackMode};

/// Tunables for [`CatalogService`].
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub write_back: WriteBackMode,
    pub clear_interval: Duration,
    pub max_count: u32,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            write_back: WriteBackMode::Detached,
            clear_interval: Duration::from_secs(300),
            max_count: 100,
        }
    }
}

impl From<&Config> for CatalogOptions {
    fn from(config: &Config) -> Self {
        Self {
            write_back: config.catalog.write_back,
            clear_interval: Duration::from_secs(config.cache.clear_interval_secs),
            max_count: config.catalog.max_page_size,
        }
    }
}

/// Operator-supplied fields for a new record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGame {
    pub title: String,
    pub platform: Platform,
    #[serde(default, rename = "coverArtURL")]
    pub cover_art_url: Option<String>,
    #[serde(default)]
    pub release_year: Option<i32>,
}

pub struct CatalogService {
    store: Arc<dyn GameStore>,
    pipeline: EnrichmentPipeline,
    cache: Arc<RandomSampleCache>,
    clear_task: Mutex<Option<JoinHandle<()>>>,
    max_count: u32,
}

impl CatalogService {
    /// Build the service and start its cache ticker.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        store: Arc<dyn GameStore>,
        provider: Arc<dyn GameMetadataProvider>,
        options: CatalogOptions,
    ) -> Self {
        let cache = Arc::new(RandomSampleCache::new());
        let clear_task = start_clear_task(Arc::clone(&cache), options.clear_interval);
        let pipeline = EnrichmentPipeline::new(Arc::clone(&store), provider, options.write_back);

        Self {
            store,
            pipeline,
            cache,
            clear_task: Mutex::new(Some(clear_task)),
            max_count: options.max_count,
        }
    }

    pub fn cache(&self) -> &RandomSampleCache {
        &self.cache
    }

    /// Title search with provider fallback.
    pub async fn search(&self, query: &str, filter: Option<Platform>) -> Result<Vec<GameRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::invalid_input("search query must not be empty"));
        }
        self.pipeline.lookup(query, filter).await
    }

    /// One page of randomly chosen games.
    ///
    /// Pages are served from the cache when possible. Otherwise the store is
    /// sampled at offset `(page - 1) * count`. An empty first page (or a store
    /// failure on it) falls back to the provider; only when that also yields
    /// nothing is [`Error::NoResults`] returned. Later pages may be empty.
    pub async fn random_games(
        &self,
        page: u32,
        count: u32,
        filter: Option<Platform>,
    ) -> Result<Arc<Vec<GameRecord>>> {
        if page == 0 {
            return Err(Error::invalid_input("page starts at 1"));
        }
        if count == 0 || count > self.max_count {
            return Err(Error::invalid_input(format!(
                "count must be between 1 and {}",
                self.max_count
            )));
        }

        if let Some(hit) = self.cache.get(page, count, filter) {
            debug!(page, count, ?filter, "Random games cache hit");
            return Ok(hit);
        }

        let offset = (page - 1).saturating_mul(count);
        let local = match self.store.sample_random(count, offset, filter) {
            Ok(records) => records,
            Err(e) if page == 1 => {
                warn!(error = %e, "Random sample from store failed; asking provider");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let records = if !local.is_empty() || page > 1 {
            local
        } else {
            let sampled = self.pipeline.sample(count, filter).await?;
            if sampled.is_empty() {
                return Err(Error::no_results(
                    "no games in the catalog or from the provider",
                ));
            }
            info!(count = sampled.len(), ?filter, "Seeded random games from provider");
            sampled
        };

        if records.is_empty() {
            return Ok(Arc::new(records));
        }
        Ok(self.cache.put(page, count, filter, records))
    }

    /// Fetch a single record by its identifier string.
    pub fn get_game(&self, raw_id: &str) -> Result<GameRecord> {
        let id = GameId::parse(raw_id)?;
        self.store
            .find_by_id(id)?
            .ok_or_else(|| Error::not_found(format!("game {id}")))
    }

    /// Replace the performance entry of one console variant and return the
    /// updated record.
    pub fn update_performance(
        &self,
        raw_id: &str,
        variant: ConsoleVariant,
        entry: ConsolePerformance,
    ) -> Result<GameRecord> {
        let id = GameId::parse(raw_id)?;
        let stored = self.store.merge_performance(id, variant, &entry)?;

        info!(%id, %variant, "Updated console performance");
        Ok(stored)
    }

    /// Create (or replace, by title) an operator-entered record.
    pub fn create_game(&self, new: NewGame) -> Result<GameRecord> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(Error::invalid_input("title must not be empty"));
        }

        let mut record = GameRecord::new(title, new.platform);
        record.cover_art_url = new.cover_art_url;
        record.release_year = new.release_year;

        let stored = self.store.upsert_by_title(&record)?;
        info!(title = %stored.title, id = ?stored.id, "Created game record");
        Ok(stored)
    }

    /// Wait for pending write-backs.
    pub async fn settle(&self) {
        self.pipeline.settle().await;
    }

    /// Stop the cache ticker and drain pending write-backs.
    pub async fn shutdown(&self) {
        if let Some(task) = self.clear_task.lock().take() {
            task.abort();
        }
        self.pipeline.settle().await;
        info!("Catalog service stopped");
    }
}

impl Drop for CatalogService {
    fn drop(&mut self) {
        if let Some(task) = self.clear_task.get_mut().take() {
            task.abort();
        }
    }
}
