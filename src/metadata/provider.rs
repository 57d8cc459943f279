//! Trait definition and types for game metadata providers.
//!
//! A provider wraps one external catalog API and returns [`ProviderGame`]
//! records that cover every platform generically. Splitting them into
//! platform-specific local records is the enrichment pipeline's job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Provider records
// ---------------------------------------------------------------------------

/// A game as returned by the external metadata service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderGame {
    /// Provider-specific numeric identifier.
    pub id: u64,
    /// Display title, without any platform tag.
    pub name: String,
    /// First release as unix seconds, if known.
    pub first_release_date: Option<i64>,
    /// Fully-qualified cover art URL, if the provider has one.
    pub cover_url: Option<String>,
    /// Names of every platform the game was released on.
    pub platforms: Vec<String>,
}

impl ProviderGame {
    /// Calendar year of the first release.
    pub fn release_year(&self) -> Option<i32> {
        use chrono::Datelike;

        self.first_release_date
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.year())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures talking to a metadata provider.
///
/// Every variant is fatal to the call that produced it; providers never
/// degrade to an empty result on error.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Client credentials are missing.
    #[error("provider is not configured: {0}")]
    NotConfigured(String),

    /// The credential exchange failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with a non-success status.
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("undecodable response: {0}")]
    Decode(String),
}

impl From<ProviderError> for psperf_common::Error {
    fn from(e: ProviderError) -> Self {
        psperf_common::Error::provider(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Async trait that game metadata providers implement.
///
/// Implementations are shared across request tasks behind an `Arc`, so any
/// mutable state (credentials, rate limiters) must be internally
/// synchronized.
#[async_trait]
pub trait GameMetadataProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"igdb"`).
    fn name(&self) -> &'static str;

    /// Search for base games matching `title` on the supported platforms.
    async fn search(&self, title: &str) -> Result<Vec<ProviderGame>, ProviderError>;

    /// Fetch up to `count` base games for the supported platforms, in an
    /// order that varies between calls.
    async fn random_sample(&self, count: u32) -> Result<Vec<ProviderGame>, ProviderError>;
}
