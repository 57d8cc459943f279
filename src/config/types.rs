use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::metadata::WriteBackMode;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub igdb: IgdbConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS (empty = any origin)
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite file holding the game catalog
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("psperf.sqlite")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IgdbConfig {
    /// Twitch application client id
    #[serde(default)]
    pub client_id: String,

    /// Twitch application client secret
    #[serde(default)]
    pub client_secret: String,

    #[serde(default = "default_igdb_base_url")]
    pub base_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Outbound request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Request budget against the games endpoint (default: 4)
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Upper bound on how long an access token is trusted, in hours (default: 24)
    #[serde(default = "default_token_validity_hours")]
    pub token_validity_hours: u64,
}

impl IgdbConfig {
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

fn default_igdb_base_url() -> String {
    "https://api.igdb.com/v4".to_string()
}
fn default_token_url() -> String {
    "https://id.twitch.tv/oauth2/token".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_requests_per_second() -> u32 {
    4
}
fn default_token_validity_hours() -> u64 {
    24
}

impl Default for IgdbConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            base_url: default_igdb_base_url(),
            token_url: default_token_url(),
            timeout_secs: default_timeout_secs(),
            requests_per_second: default_requests_per_second(),
            token_validity_hours: default_token_validity_hours(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// How often the random-games cache is emptied (default: 300)
    #[serde(default = "default_clear_interval")]
    pub clear_interval_secs: u64,
}

fn default_clear_interval() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            clear_interval_secs: default_clear_interval(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Games per random-games page when the caller gives no count
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Largest count a caller may request
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    #[serde(default)]
    pub write_back: WriteBackMode,
}

fn default_page_size() -> u32 {
    12
}
fn default_max_page_size() -> u32 {
    100
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            write_back: WriteBackMode::default(),
        }
    }
}
