//! Typed ID wrappers.
//!
//! Record identifiers are opaque UUIDs assigned by the store. Parsing from
//! user input goes through [`GameId::parse`], which reports malformed input as
//! [`Error::InvalidIdentifier`](crate::Error::InvalidIdentifier).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Unique identifier for a game record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(Uuid);

impl GameId {
    /// Generate a new random game ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier received from a caller.
    pub fn parse(raw: &str) -> Result<Self> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| Error::invalid_identifier(raw.to_string()))
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for GameId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<GameId> for Uuid {
    fn from(id: GameId) -> Self {
        id.0
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for GameId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
