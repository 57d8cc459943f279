//! Client-credentials bearer tokens for the IGDB API.
//!
//! IGDB authenticates through Twitch: the client id and secret are exchanged
//! for an app access token, which is then sent as `Authorization: Bearer` on
//! every query. The token is fetched lazily on first use and cached until it
//! expires.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::metadata::provider::ProviderError;

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Lazily-refreshed app access token.
///
/// The cache is guarded by an async mutex held across the exchange, so when
/// several requests find the token missing or expired at once only the first
/// performs the exchange and the rest reuse its result.
pub struct TwitchAuth {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    validity: Duration,
    cached: Mutex<Option<AccessToken>>,
}

impl TwitchAuth {
    /// Create a token source.
    ///
    /// `validity` caps how long a token is trusted; a shorter `expires_in`
    /// from the token endpoint wins.
    pub fn new(
        client: reqwest::Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        validity: Duration,
    ) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            validity,
            cached: Mutex::new(None),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Return a valid bearer token, exchanging credentials if needed.
    pub async fn bearer(&self) -> Result<String, ProviderError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.value.clone());
        }

        let token = self.exchange().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Drop the cached token if it is still the one the server rejected, so
    /// the next call re-authenticates. A token exchanged by another request
    /// in the meantime is kept.
    pub async fn invalidate(&self, rejected: &str) {
        let mut cached = self.cached.lock().await;
        if cached.as_ref().is_some_and(|t| t.value == rejected) {
            *cached = None;
            debug!("Discarded rejected IGDB access token");
        }
    }

    async fn exchange(&self) -> Result<AccessToken, ProviderError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(ProviderError::NotConfigured(
                "IGDB client id and secret are required".into(),
            ));
        }

        let resp = self
            .client
            .post(&self.token_url)
            .query(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Auth(format!("token request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ProviderError::Auth(format!("token response unreadable: {e}")))?;

        if !status.is_success() {
            return Err(ProviderError::Auth(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Auth(format!("token response undecodable: {e}")))?;

        let lifetime = self.validity.min(Duration::from_secs(parsed.expires_in));
        info!(valid_for_secs = lifetime.as_secs(), "Obtained IGDB access token");

        Ok(AccessToken {
            value: parsed.access_token,
            expires_at: Instant::now() + lifetime,
        })
    }
}
