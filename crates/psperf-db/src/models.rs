//! Game record models.
//!
//! These types are both the stored document shape and the HTTP payload
//! shape. Field names are camelCase and stable. `hasGraphicsSettings` is
//! always present (`null` while unknown); the mode objects are omitted until
//! measured.

use std::collections::BTreeMap;

use psperf_common::{ConsoleVariant, Error, GameId, Platform, Result};
use serde::{Deserialize, Serialize};

/// A single measured graphics mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Performance {
    pub fps: u32,
    pub resolution: String,
}

impl Performance {
    pub fn new(fps: u32, resolution: impl Into<String>) -> Self {
        Self {
            fps,
            resolution: resolution.into(),
        }
    }
}

/// Performance data for one console variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolePerformance {
    /// `None` until someone reports whether the game exposes a mode toggle.
    #[serde(default)]
    pub has_graphics_settings: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fidelity_mode: Option<Performance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_mode: Option<Performance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_mode: Option<Performance>,
}

impl ConsolePerformance {
    /// An entry with nothing known yet.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// True when no data has been supplied for this variant.
    pub fn is_unknown(&self) -> bool {
        self.has_graphics_settings.is_none()
            && self.fidelity_mode.is_none()
            && self.performance_mode.is_none()
            && self.standard_mode.is_none()
    }
}

/// A platform-specific game record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// Assigned by the store; absent until the record has been persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<GameId>,
    pub title: String,
    #[serde(rename = "coverArtURL", default, skip_serializing_if = "Option::is_none")]
    pub cover_art_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    pub platform: Platform,
    #[serde(rename = "compatibleConsoles", alias = "compatibleConsolePerformance")]
    pub compatible_consoles: BTreeMap<ConsoleVariant, ConsolePerformance>,
    /// Identifier of the provider record this was derived from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<u64>,
}

impl GameRecord {
    /// Build an unsaved record with one unknown entry per compatible variant.
    pub fn new(title: impl Into<String>, platform: Platform) -> Self {
        let compatible_consoles = platform
            .compatible_variants()
            .iter()
            .map(|variant| (*variant, ConsolePerformance::unknown()))
            .collect();

        Self {
            id: None,
            title: title.into(),
            cover_art_url: None,
            release_year: None,
            platform,
            compatible_consoles,
            provider_id: None,
        }
    }

    /// True when the performance keys are exactly the platform's variant set.
    pub fn has_complete_variant_set(&self) -> bool {
        let expected = self.platform.compatible_variants();
        self.compatible_consoles.len() == expected.len()
            && expected
                .iter()
                .all(|v| self.compatible_consoles.contains_key(v))
    }

    /// Add entries for any compatible variant that is missing and drop keys
    /// the platform does not support.
    pub fn normalize_variants(&mut self) {
        let expected = self.platform.compatible_variants();
        self.compatible_consoles.retain(|v, _| expected.contains(v));
        for variant in expected {
            self.compatible_consoles.entry(*variant).or_default();
        }
    }

    /// Replace the entry for a single variant, leaving siblings untouched.
    pub fn merge_performance(
        &mut self,
        variant: ConsoleVariant,
        entry: ConsolePerformance,
    ) -> Result<()> {
        if !self.platform.compatible_variants().contains(&variant) {
            return Err(Error::invalid_input(format!(
                "{} is not a compatible console for a {} game",
                variant, self.platform
            )));
        }
        self.compatible_consoles.insert(variant, entry);
        Ok(())
    }
}
