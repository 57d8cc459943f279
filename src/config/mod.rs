mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./psperf.toml",
        "~/.config/psperf/config.toml",
        "/etc/psperf/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    let mut config = Config::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config)?;
    Ok(config)
}

/// Overlay deployment settings from the environment.
///
/// Secrets are expected to come from here rather than the config file.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(id) = get("TWITCH_CLIENT_ID") {
        config.igdb.client_id = id;
    }
    if let Some(secret) = get("TWITCH_CLIENT_SECRET") {
        config.igdb.client_secret = secret;
    }
    if let Some(path) = get("PSPERF_DATABASE") {
        config.database.path = PathBuf::from(shellexpand::tilde(&path).as_ref());
    }
    if let Some(port) = get("PORT") {
        match port.trim().parse() {
            Ok(port) => config.server.port = port,
            Err(_) => tracing::warn!(value = %port, "Ignoring unparseable PORT"),
        }
    }
    if let Some(origin) = get("FRONTEND_URL") {
        let origin = origin.trim_end_matches('/').to_string();
        if !config.server.allowed_origins.contains(&origin) {
            config.server.allowed_origins.push(origin);
        }
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.igdb.requests_per_second == 0 {
        anyhow::bail!("igdb.requests_per_second must be at least 1");
    }

    if config.igdb.timeout_secs == 0 {
        anyhow::bail!("igdb.timeout_secs must be at least 1");
    }

    if config.cache.clear_interval_secs == 0 {
        anyhow::bail!("cache.clear_interval_secs must be at least 1");
    }

    if config.catalog.page_size == 0 || config.catalog.page_size > config.catalog.max_page_size {
        anyhow::bail!(
            "catalog.page_size must be between 1 and max_page_size ({})",
            config.catalog.max_page_size
        );
    }

    if !config.igdb.has_credentials() {
        tracing::warn!("IGDB credentials are not set; provider lookups will fail");
    }

    Ok(())
}
