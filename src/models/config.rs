//! Configuration model loaded from external sources.

use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
/// Storage backend used for users and generations.
pub enum StorageKind {
    /// Diesel-backed SQLite database at `database_url`.
    #[default]
    Sqlite,
    /// Process-local maps, lost on restart.
    Memory,
}

#[derive(Clone, Debug, Deserialize)]
/// Token issuance and password hashing settings.
pub struct AuthConfig {
    /// HMAC secret used to sign bearer tokens.
    pub secret: String,
    /// Lifetime of issued tokens.
    pub token_ttl_hours: i64,
    /// bcrypt work factor applied to new passwords.
    pub bcrypt_cost: u32,
}

#[derive(Clone, Copy, Debug, Deserialize)]
/// Bounds applied to the per-user generation history.
pub struct HistoryConfig {
    /// Number of generations returned by the history endpoint.
    pub limit: usize,
    /// Number of generations kept per user; older ones are pruned.
    pub retention: Option<usize>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryConfigError {
    #[error("history.retention must keep at least one generation")]
    ZeroRetention,
}

impl HistoryConfig {
    /// Rejects settings that would prune a generation as soon as it is stored.
    pub fn validate(&self) -> Result<(), HistoryConfigError> {
        match self.retention {
            Some(0) => Err(HistoryConfigError::ZeroRetention),
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
/// Parameters of the simulated image generation engine.
pub struct SimulatorConfig {
    /// Probability in `[0, 1]` that a request is rejected as overloaded.
    pub failure_rate: f64,
    /// Artificial processing delay.
    pub latency_ms: u64,
    /// Pool of pre-rendered images returned as results.
    pub images: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    #[serde(default)]
    pub storage: StorageKind,
    pub database_url: String,
    pub uploads_dir: String,
    pub mock_images_dir: String,
    /// Directory with the built frontend, served at `/` when present.
    pub static_dir: Option<String>,
    pub auth: AuthConfig,
    pub history: HistoryConfig,
    pub simulator: SimulatorConfig,
}
