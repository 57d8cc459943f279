//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which wires an in-memory store, a scripted
//! metadata provider and the full [`AppContext`], plus helpers for driving the
//! router with `oneshot`.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use http_body_util::BodyExt;

use psperf::catalog::{CatalogOptions, CatalogService};
use psperf::config::Config;
use psperf::metadata::{GameMetadataProvider, ProviderError, ProviderGame, WriteBackMode};
use psperf::server::{create_router, AppContext};
use psperf_db::pool::init_memory_pool;
use psperf_db::store::SqliteGameStore;

/// Provider returning a fixed list of games and counting calls.
pub struct ScriptedProvider {
    games: Vec<ProviderGame>,
    fail: bool,
    pub searches: AtomicUsize,
    pub samples: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(games: Vec<ProviderGame>) -> Self {
        Self {
            games,
            fail: false,
            searches: AtomicUsize::new(0),
            samples: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn samples(&self) -> usize {
        self.samples.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GameMetadataProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn search(&self, _title: &str) -> Result<Vec<ProviderGame>, ProviderError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(self.games.clone())
    }

    async fn random_sample(&self, _count: u32) -> Result<Vec<ProviderGame>, ProviderError> {
        self.samples.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(self.games.clone())
    }
}

pub fn provider_game(id: u64, name: &str, platforms: &[&str]) -> ProviderGame {
    ProviderGame {
        id,
        name: name.to_string(),
        first_release_date: Some(1_536_278_400),
        cover_url: Some(format!("https://images.igdb.com/igdb/image/upload/t_cover_big/{id}.jpg")),
        platforms: platforms.iter().map(|p| p.to_string()).collect(),
    }
}

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database.
pub struct TestHarness {
    pub ctx: AppContext,
    pub store: Arc<SqliteGameStore>,
    pub provider: Arc<ScriptedProvider>,
}

impl TestHarness {
    /// Harness with an empty store and a provider that knows `games`.
    pub fn new(games: Vec<ProviderGame>) -> Self {
        Self::with_provider(ScriptedProvider::new(games), Config::default())
    }

    pub fn with_provider(provider: ScriptedProvider, mut config: Config) -> Self {
        config.catalog.write_back = WriteBackMode::Awaited;

        let store = Arc::new(SqliteGameStore::new(
            init_memory_pool().expect("failed to create in-memory pool"),
        ));
        let provider = Arc::new(provider);
        let catalog = Arc::new(CatalogService::new(
            store.clone(),
            provider.clone(),
            CatalogOptions::from(&config),
        ));

        let ctx = AppContext {
            catalog,
            config: Arc::new(config),
        };

        Self {
            ctx,
            store,
            provider,
        }
    }

    pub fn router(&self) -> axum::Router {
        create_router(self.ctx.clone())
    }
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    serde_json::from_str(&body_to_string(body).await).unwrap()
}
