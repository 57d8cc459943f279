mod cli;

use psperf::{
    catalog::{CatalogOptions, CatalogService},
    config::{self, Config},
    metadata::providers::IgdbProvider,
    server,
};
use psperf_common::Platform;
use psperf_db::pool::init_pool;
use psperf_db::store::SqliteGameStore;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;

/// Open the store, build the provider client and start the catalog service.
fn open_catalog(config: &Config) -> Result<Arc<CatalogService>> {
    let db_path = config.database.path.to_string_lossy();
    tracing::info!("Initializing database at {}", db_path);
    let pool = init_pool(&db_path).context("Failed to open game database")?;
    let store = Arc::new(SqliteGameStore::new(pool));

    let provider = Arc::new(IgdbProvider::new(&config.igdb).context("Failed to set up IGDB client")?);

    Ok(Arc::new(CatalogService::new(
        store,
        provider,
        CatalogOptions::from(config),
    )))
}

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting psperf server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    let catalog = open_catalog(&config)?;
    server::start_server(config, catalog).await
}

async fn search(
    query: &str,
    console: Option<&str>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let filter = Platform::parse_filter(console.unwrap_or_default())?;

    let catalog = open_catalog(&config)?;
    let games = catalog.search(query, filter).await?;
    catalog.shutdown().await;

    println!("{}", serde_json::to_string_pretty(&games)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "psperf=trace,psperf_db=debug,psperf_common=debug,tower_http=debug".to_string()
        } else {
            "psperf=info,psperf_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Search { query, console } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(search(&query, console.as_deref(), cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("psperf {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, checking defaults");
            config::load_config_or_default(None)?
        }
    };

    println!("✓ Configuration is valid");
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Database: {}", config.database.path.display());
    println!("  IGDB: {}", config.igdb.base_url);
    println!(
        "  IGDB credentials: {}",
        if config.igdb.has_credentials() { "set" } else { "missing" }
    );
    println!("  Cache clear interval: {}s", config.cache.clear_interval_secs);
    println!("  Page size: {}", config.catalog.page_size);
    println!("  Write-back: {:?}", config.catalog.write_back);

    Ok(())
}
