//! Game metadata lookup and enrichment.
//!
//! # Module layout
//!
//! - [`provider`] -- Trait definition and shared data types.
//! - [`providers`] -- Concrete provider implementations (IGDB).
//! - [`enrichment`] -- Turning provider games into platform-specific local
//!   records and writing them back to the store.

pub mod enrichment;
pub mod provider;
pub mod providers;

pub use enrichment::{EnrichmentPipeline, WriteBackMode};
pub use provider::{GameMetadataProvider, ProviderError, ProviderGame};
