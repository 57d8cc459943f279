//! Concrete metadata provider implementations.
//!
//! Each submodule wraps a single external API and implements the
//! [`GameMetadataProvider`](super::GameMetadataProvider) trait.

pub mod igdb;
pub mod twitch_auth;

pub use igdb::IgdbProvider;
pub use twitch_auth::TwitchAuth;
