//! The game catalog: random pages, title search, single-game reads and
//! performance updates.
//!
//! - [`cache`] -- Time-bounded cache in front of the random-games path.
//! - [`service`] -- [`CatalogService`], the entry point the transport layer
//!   calls.

pub mod cache;
pub mod service;

pub use cache::{start_clear_task, RandomSampleCache, SampleKey};
pub use service::{CatalogOptions, CatalogService, NewGame};
