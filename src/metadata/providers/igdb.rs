//! IGDB (Internet Game Database) metadata provider.
//!
//! Implements [`GameMetadataProvider`] against the IGDB v4 API.
//!
//! Features:
//! - Lazily refreshed Twitch app token shared by all requests.
//! - Token-bucket rate limiting via [`governor`] (4 requests / second by default).
//! - Automatic retry on HTTP 429 with `Retry-After` header support (max 3 retries).
//! - One re-authentication when the games endpoint rejects the token.
//! - Queries restricted to PS4/PS5 base games.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use super::twitch_auth::TwitchAuth;
use crate::config::IgdbConfig;
use crate::metadata::provider::{GameMetadataProvider, ProviderError, ProviderGame};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// IGDB platform ids for PlayStation 4 and PlayStation 5.
pub const PLATFORM_IDS: [u32; 2] = [48, 167];

/// IGDB game categories treated as base games: main game and standalone
/// expansion.
pub const BASE_CATEGORIES: [u32; 2] = [0, 4];

const FIELDS: &str = "name,first_release_date,cover.url,platforms.name";
const SEARCH_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 500;
/// Random samples start somewhere in the top this-many titles by rating count.
const RANDOM_WINDOW: u32 = 400;
const MAX_RETRIES: u32 = 3;
/// Longest `Retry-After` honoured before retrying anyway.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// IGDB API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct IgdbGame {
    id: u64,
    name: String,
    #[serde(default)]
    first_release_date: Option<i64>,
    #[serde(default)]
    cover: Option<IgdbCover>,
    #[serde(default)]
    platforms: Vec<IgdbPlatform>,
}

#[derive(Debug, Deserialize)]
struct IgdbCover {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IgdbPlatform {
    #[serde(default)]
    name: Option<String>,
}

impl From<IgdbGame> for ProviderGame {
    fn from(game: IgdbGame) -> Self {
        ProviderGame {
            id: game.id,
            name: game.name,
            first_release_date: game.first_release_date,
            cover_url: game
                .cover
                .and_then(|c| c.url)
                .map(|url| normalize_cover_url(&url)),
            platforms: game.platforms.into_iter().filter_map(|p| p.name).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Query construction
// ---------------------------------------------------------------------------

/// Expand IGDB's protocol-relative thumbnail URL into an absolute cover URL.
pub fn normalize_cover_url(url: &str) -> String {
    let absolute = match url.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    };
    absolute.replace("t_thumb", "t_cover_big")
}

fn join(ids: &[u32]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn base_filter() -> String {
    format!(
        "platforms = ({}) & category = ({}) & version_parent = null",
        join(&PLATFORM_IDS),
        join(&BASE_CATEGORIES)
    )
}

fn escape(term: &str) -> String {
    term.replace('\\', "\\\\").replace('"', "\\\"")
}

fn search_query(title: &str) -> String {
    format!(
        "search \"{}\";\nfields {FIELDS};\nwhere {};\nlimit {SEARCH_LIMIT};",
        escape(title),
        base_filter()
    )
}

fn sample_query(count: u32, offset: u32) -> String {
    format!(
        "fields {FIELDS};\nwhere {} & total_rating_count != null;\nsort total_rating_count desc;\nlimit {count};\noffset {offset};",
        base_filter()
    )
}

/// Delay requested by a 429 response, one second when absent and never more
/// than [`MAX_RETRY_AFTER`].
fn retry_delay(headers: &reqwest::header::HeaderMap) -> Duration {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(1))
        .min(MAX_RETRY_AFTER)
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// IGDB metadata provider.
///
/// # Examples
///
/// ```no_run
/// use psperf::config::IgdbConfig;
/// use psperf::metadata::providers::IgdbProvider;
///
/// let config = IgdbConfig {
///     client_id: "id".into(),
///     client_secret: "secret".into(),
///     ..Default::default()
/// };
/// let provider = IgdbProvider::new(&config).unwrap();
/// ```
pub struct IgdbProvider {
    client: reqwest::Client,
    base_url: String,
    auth: TwitchAuth,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl IgdbProvider {
    pub fn new(config: &IgdbConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Network(format!("failed to build HTTP client: {e}")))?;

        let rps = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rps));

        let auth = TwitchAuth::new(
            client.clone(),
            config.token_url.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
            Duration::from_secs(config.token_validity_hours * 3600),
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth,
            rate_limiter,
        })
    }

    /// POST an Apicalypse query to the games endpoint and decode the result.
    async fn query_games(&self, body: String) -> Result<Vec<ProviderGame>, ProviderError> {
        let url = format!("{}/games", self.base_url);
        let mut retries = 0u32;
        let mut reauthenticated = false;

        loop {
            self.rate_limiter.until_ready().await;
            let token = self.auth.bearer().await?;

            let resp = self
                .client
                .post(&url)
                .header("Client-ID", self.auth.client_id())
                .bearer_auth(&token)
                .header(reqwest::header::ACCEPT, "application/json")
                .header(reqwest::header::CONTENT_TYPE, "text/plain")
                .body(body.clone())
                .send()
                .await
                .map_err(|e| ProviderError::Network(format!("IGDB request failed: {e}")))?;

            let status = resp.status();

            if status == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RETRIES {
                retries += 1;
                let wait = retry_delay(resp.headers());
                warn!(retry = retries, wait_secs = wait.as_secs(), "IGDB returned 429, backing off");
                tokio::time::sleep(wait).await;
                continue;
            }

            if status == StatusCode::UNAUTHORIZED {
                self.auth.invalidate(&token).await;
                if !reauthenticated {
                    reauthenticated = true;
                    warn!("IGDB rejected the access token, re-authenticating");
                    continue;
                }
            }

            let text = resp
                .text()
                .await
                .map_err(|e| ProviderError::Network(format!("IGDB response unreadable: {e}")))?;

            if !status.is_success() {
                return Err(ProviderError::Status {
                    status: status.as_u16(),
                    body: text,
                });
            }

            let games: Vec<IgdbGame> = serde_json::from_str(&text)
                .map_err(|e| ProviderError::Decode(format!("IGDB games response: {e}")))?;

            debug!(count = games.len(), "IGDB query returned games");
            return Ok(games.into_iter().map(ProviderGame::from).collect());
        }
    }
}

#[async_trait]
impl GameMetadataProvider for IgdbProvider {
    fn name(&self) -> &'static str {
        "igdb"
    }

    async fn search(&self, title: &str) -> Result<Vec<ProviderGame>, ProviderError> {
        debug!(title, "Searching IGDB");
        self.query_games(search_query(title)).await
    }

    async fn random_sample(&self, count: u32) -> Result<Vec<ProviderGame>, ProviderError> {
        let limit = count.clamp(1, MAX_LIMIT);
        let offset = rand::thread_rng().gen_range(0..=RANDOM_WINDOW);
        debug!(limit, offset, "Sampling IGDB");

        let mut games = self.query_games(sample_query(limit, offset)).await?;
        games.shuffle(&mut rand::thread_rng());
        Ok(games)
    }
}
