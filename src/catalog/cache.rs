//! In-memory cache for random-games pages.
//!
//! Pages are keyed by the exact `(page, count, platform)` request and stored
//! behind an `Arc`, so a hit hands back the very page that was cached. The
//! whole map is emptied periodically by [`start_clear_task`] rather than
//! expiring entries one by one.

use parking_lot::RwLock;
use psperf_common::Platform;
use psperf_db::models::GameRecord;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Cache key: the request tuple, verbatim.
pub type SampleKey = (u32, u32, Option<Platform>);

/// Thread-safe cache of random-games pages.
///
/// The write lock covers only map mutation. Fetching a missing page happens
/// outside the cache, so two concurrent misses may both fetch and the later
/// `put` wins.
#[derive(Default)]
pub struct RandomSampleCache {
    entries: RwLock<HashMap<SampleKey, Arc<Vec<GameRecord>>>>,
}

impl RandomSampleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, page: u32, count: u32, platform: Option<Platform>) -> Option<Arc<Vec<GameRecord>>> {
        self.entries.read().get(&(page, count, platform)).cloned()
    }

    /// Store a page and return the shared handle to it.
    pub fn put(
        &self,
        page: u32,
        count: u32,
        platform: Option<Platform>,
        records: Vec<GameRecord>,
    ) -> Arc<Vec<GameRecord>> {
        let records = Arc::new(records);
        self.entries
            .write()
            .insert((page, count, platform), Arc::clone(&records));
        records
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write();
        let dropped = entries.len();
        entries.clear();
        if dropped > 0 {
            debug!(dropped, "Cleared random-games cache");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Start a background task that empties the cache every `interval`.
///
/// The first clear happens one full interval after start. Abort the returned
/// handle to stop the ticker.
pub fn start_clear_task(
    cache: Arc<RandomSampleCache>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            cache.clear();
        }
    })
}
