//! End-to-end catalog scenarios over a file-backed SQLite store.

mod common;

use std::sync::Arc;

use common::{provider_game, ScriptedProvider};
use psperf::catalog::{CatalogOptions, CatalogService};
use psperf::metadata::WriteBackMode;
use psperf_common::{ConsoleVariant, Error, Platform};
use psperf_db::models::{ConsolePerformance, GameRecord, Performance};
use psperf_db::pool::init_pool;
use psperf_db::store::{GameStore, SqliteGameStore};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    store: Arc<SqliteGameStore>,
    provider: Arc<ScriptedProvider>,
    catalog: CatalogService,
}

fn fixture(provider: ScriptedProvider, write_back: WriteBackMode) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("games.sqlite");
    let store = Arc::new(SqliteGameStore::new(init_pool(&path.to_string_lossy()).unwrap()));
    let provider = Arc::new(provider);

    let catalog = CatalogService::new(
        store.clone(),
        provider.clone(),
        CatalogOptions {
            write_back,
            ..Default::default()
        },
    );

    Fixture {
        _dir: dir,
        store,
        provider,
        catalog,
    }
}

#[tokio::test]
async fn spider_man_with_empty_store() {
    let f = fixture(
        ScriptedProvider::new(vec![provider_game(
            1942,
            "Spider-Man",
            &["PlayStation 4", "PlayStation 5"],
        )]),
        WriteBackMode::Detached,
    );

    let results = f.catalog.search("Spider-Man", None).await.unwrap();
    let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["[PS4] Spider-Man", "[PS5] Spider-Man"]);

    f.catalog.settle().await;

    let ps4 = f.store.find_by_title("[PS4] Spider-Man", None).unwrap();
    let ps5 = f.store.find_by_title("[PS5] Spider-Man", None).unwrap();
    assert_eq!(ps4.len(), 1);
    assert_eq!(ps5.len(), 1);
    assert_eq!(ps4[0].platform, Platform::PlayStation4);
    assert_eq!(ps5[0].provider_id, Some(1942));
    assert!(ps5[0].has_complete_variant_set());
}

#[tokio::test]
async fn second_search_does_not_reach_provider() {
    let f = fixture(
        ScriptedProvider::new(vec![provider_game(1, "Returnal", &["PlayStation 5"])]),
        WriteBackMode::Awaited,
    );

    f.catalog.search("Returnal", None).await.unwrap();
    let again = f.catalog.search("returnal", None).await.unwrap();

    assert_eq!(again.len(), 1);
    assert_eq!(f.provider.searches(), 1);
}

#[tokio::test]
async fn search_filter_excludes_other_family() {
    let f = fixture(
        ScriptedProvider::new(vec![provider_game(1, "Bloodborne", &["PlayStation 4"])]),
        WriteBackMode::Awaited,
    );

    let results = f
        .catalog
        .search("Bloodborne", Some(Platform::PlayStation5))
        .await
        .unwrap();
    assert!(results.is_empty());
    assert_eq!(f.store.count(None).unwrap(), 0);
}

#[tokio::test]
async fn repeated_upsert_keeps_one_record_per_title() {
    let f = fixture(
        ScriptedProvider::new(vec![
            provider_game(1, "Doom", &["PlayStation 4"]),
            provider_game(2, "Doom", &["PlayStation 4"]),
        ]),
        WriteBackMode::Awaited,
    );

    let results = f.catalog.search("Doom", None).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, results[1].id);
    assert_eq!(f.store.count(None).unwrap(), 1);

    let stored = f.store.find_by_title("[PS4] Doom", None).unwrap();
    assert_eq!(stored[0].provider_id, Some(2));
}

#[tokio::test]
async fn random_page_of_five_ps5_games() {
    let f = fixture(ScriptedProvider::new(Vec::new()), WriteBackMode::Detached);
    for i in 0..5 {
        f.store
            .upsert_by_title(&GameRecord::new(format!("[PS5] Game {i}"), Platform::PlayStation5))
            .unwrap();
    }

    let page = f
        .catalog
        .random_games(1, 12, Some(Platform::PlayStation5))
        .await
        .unwrap();
    assert_eq!(page.len(), 5);
    assert_eq!(f.provider.samples(), 0);
}

#[tokio::test]
async fn merge_on_missing_id_leaves_store_unchanged() {
    let f = fixture(ScriptedProvider::new(Vec::new()), WriteBackMode::Detached);
    let stored = f
        .store
        .upsert_by_title(&GameRecord::new("[PS5] Returnal", Platform::PlayStation5))
        .unwrap();

    let entry = ConsolePerformance {
        has_graphics_settings: Some(true),
        fidelity_mode: Some(Performance::new(30, "4K")),
        ..Default::default()
    };
    let err = f
        .catalog
        .update_performance(&uuid::Uuid::new_v4().to_string(), ConsoleVariant::Ps5, entry)
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let reloaded = f.store.find_by_id(stored.id.unwrap()).unwrap().unwrap();
    assert_eq!(reloaded, stored);
}

#[tokio::test]
async fn shutdown_drains_pending_write_backs() {
    let games = (0..20)
        .map(|i| provider_game(i, &format!("Game {i}"), &["PlayStation 4", "PlayStation 5"]))
        .collect();
    let f = fixture(ScriptedProvider::new(games), WriteBackMode::Detached);

    let page = f.catalog.random_games(1, 12, None).await.unwrap();
    assert_eq!(page.len(), 12);

    f.catalog.shutdown().await;
    assert_eq!(f.store.count(None).unwrap(), 12);
}
