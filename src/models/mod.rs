//! Database, configuration and authentication models shared across the studio.

#[cfg(feature = "server")]
pub mod auth;
#[cfg(feature = "server")]
pub mod config;
pub mod generation;
pub mod user;
