//! psperf-common: Shared types, constants, and errors.
//!
//! This crate provides common functionality used across psperf:
//!
//! - **Typed IDs**: Type-safe UUID wrapper for game records
//! - **Core Types**: Console families and hardware variants
//! - **Error Handling**: Common error type and result alias
//!
//! # Examples
//!
//! ```
//! use psperf_common::{ConsoleVariant, Error, GameId, Platform, Result};
//!
//! let id = GameId::new();
//! assert!(Platform::PlayStation4
//!     .compatible_variants()
//!     .contains(&ConsoleVariant::Ps5Pro));
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("game"))
//! }
//! # let _ = id;
//! ```

pub mod error;
pub mod ids;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
