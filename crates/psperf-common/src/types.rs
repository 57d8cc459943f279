//! Console families and hardware variants.
//!
//! Both enums serialize to the display strings the public API has always
//! used ("PlayStation 4", "PS4 Pro", ...), so stored documents and HTTP
//! payloads share one vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Console family a game record is native to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    /// PlayStation 4 family.
    #[serde(rename = "PlayStation 4")]
    PlayStation4,
    /// PlayStation 5 family.
    #[serde(rename = "PlayStation 5")]
    PlayStation5,
}

impl Platform {
    /// Every recognized family, in catalog order.
    pub const ALL: [Platform; 2] = [Platform::PlayStation4, Platform::PlayStation5];

    /// Full family name, as used by the metadata provider.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlayStation4 => "PlayStation 4",
            Self::PlayStation5 => "PlayStation 5",
        }
    }

    /// Short tag used as a title prefix (`[PS4] ...`).
    pub fn tag(&self) -> &'static str {
        match self {
            Self::PlayStation4 => "PS4",
            Self::PlayStation5 => "PS5",
        }
    }

    /// Hardware variants a game for this family can run on.
    ///
    /// PS4 titles are playable on PS5 hardware through backward
    /// compatibility, so they carry all four variants.
    pub fn compatible_variants(&self) -> &'static [ConsoleVariant] {
        match self {
            Self::PlayStation4 => &[
                ConsoleVariant::Ps4,
                ConsoleVariant::Ps4Pro,
                ConsoleVariant::Ps5,
                ConsoleVariant::Ps5Pro,
            ],
            Self::PlayStation5 => &[ConsoleVariant::Ps5, ConsoleVariant::Ps5Pro],
        }
    }

    /// Match a provider platform name exactly.
    pub fn from_provider_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Parse an optional caller-supplied filter.
    ///
    /// Accepts the family name or the short tag, case-insensitively. An empty
    /// string means "no filter".
    pub fn parse_filter(raw: &str) -> Result<Option<Self>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse().map(Some)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| s.eq_ignore_ascii_case(p.name()) || s.eq_ignore_ascii_case(p.tag()))
            .ok_or_else(|| Error::invalid_input(format!("unknown platform: {s}")))
    }
}

/// A specific hardware revision within a console family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConsoleVariant {
    /// Base PlayStation 4.
    #[serde(rename = "PS4")]
    Ps4,
    /// PlayStation 4 Pro.
    #[serde(rename = "PS4 Pro")]
    Ps4Pro,
    /// Base PlayStation 5.
    #[serde(rename = "PS5")]
    Ps5,
    /// PlayStation 5 Pro.
    #[serde(rename = "PS5 Pro")]
    Ps5Pro,
}

impl ConsoleVariant {
    /// Every variant.
    pub const ALL: [ConsoleVariant; 4] = [
        ConsoleVariant::Ps4,
        ConsoleVariant::Ps4Pro,
        ConsoleVariant::Ps5,
        ConsoleVariant::Ps5Pro,
    ];

    /// Display name of the variant.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ps4 => "PS4",
            Self::Ps4Pro => "PS4 Pro",
            Self::Ps5 => "PS5",
            Self::Ps5Pro => "PS5 Pro",
        }
    }
}

impl fmt::Display for ConsoleVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConsoleVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|v| s.eq_ignore_ascii_case(v.name()))
            .ok_or_else(|| Error::invalid_input(format!("unknown console variant: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_serialization() {
        assert_eq!(
            serde_json::to_string(&Platform::PlayStation4).unwrap(),
            "\"PlayStation 4\""
        );
        let p: Platform = serde_json::from_str("\"PlayStation 5\"").unwrap();
        assert_eq!(p, Platform::PlayStation5);
    }

    #[test]
    fn test_variant_serialization() {
        assert_eq!(
            serde_json::to_string(&ConsoleVariant::Ps4Pro).unwrap(),
            "\"PS4 Pro\""
        );
        let v: ConsoleVariant = serde_json::from_str("\"PS5 Pro\"").unwrap();
        assert_eq!(v, ConsoleVariant::Ps5Pro);
    }

    #[test]
    fn test_compatible_variants() {
        assert_eq!(Platform::PlayStation4.compatible_variants().len(), 4);
        assert_eq!(
            Platform::PlayStation5.compatible_variants(),
            &[ConsoleVariant::Ps5, ConsoleVariant::Ps5Pro]
        );
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(Platform::parse_filter("").unwrap(), None);
        assert_eq!(Platform::parse_filter("  ").unwrap(), None);
        assert_eq!(
            Platform::parse_filter("PS5").unwrap(),
            Some(Platform::PlayStation5)
        );
        assert_eq!(
            Platform::parse_filter("playstation 4").unwrap(),
            Some(Platform::PlayStation4)
        );
        assert!(matches!(
            Platform::parse_filter("Xbox"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_provider_name_is_exact() {
        assert_eq!(
            Platform::from_provider_name("PlayStation 4"),
            Some(Platform::PlayStation4)
        );
        assert_eq!(Platform::from_provider_name("PlayStation 4 Pro"), None);
        assert_eq!(Platform::from_provider_name("PC (Microsoft Windows)"), None);
    }

    #[test]
    fn test_variant_parse() {
        assert_eq!("ps5 pro".parse::<ConsoleVariant>().unwrap(), ConsoleVariant::Ps5Pro);
    }
}
