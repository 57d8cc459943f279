//! Database query modules.
//!
//! - games: game record upsert, lookup, title search, random sampling and
//!   per-variant performance merges

pub mod games;
