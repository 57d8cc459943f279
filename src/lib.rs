//! psperf - PlayStation game performance catalog
//!
//! This library crate exposes the catalog, metadata and HTTP layers for
//! integration testing.

pub mod catalog;
pub mod config;
pub mod metadata;
pub mod server;
