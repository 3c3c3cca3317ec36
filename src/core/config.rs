// Startup configuration, read once from a JSON file and static for the
// process lifetime.
//
// Expected shape (camelCase keys, matching the deployed config files):
//
// {
//   "owner": "15551234567@s.net",
//   "warnLimit": 3,
//   "authGate": "admin_only",
//   "credsPath": "auth/creds.json"
// }
//
// `MINIBOT_WARN_LIMIT` overrides the file value, which is handy for local
// testing without editing the config.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Which callers pass the gate on the protected command set.
///
/// Observed deployments differ here; both modes exist on purpose instead of
/// being merged into one behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthGate {
    /// Group admins only (the default).
    AdminOnly,
    /// The configured owner passes even without group admin.
    OwnerOrAdmin,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    /// Participant identifier of the bot owner.
    pub owner: String,

    /// Warnings before automatic removal. Must be at least 1.
    #[serde(default = "default_warn_limit")]
    pub warn_limit: u32,

    #[serde(default = "default_auth_gate")]
    pub auth_gate: AuthGate,

    /// Where updated session credentials are persisted.
    #[serde(default = "default_creds_path")]
    pub creds_path: PathBuf,
}

fn default_warn_limit() -> u32 {
    3
}

fn default_auth_gate() -> AuthGate {
    AuthGate::AdminOnly
}

fn default_creds_path() -> PathBuf {
    PathBuf::from("auth/creds.json")
}

impl BotConfig {
    /// Load and validate the config file, applying environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: BotConfig = serde_json::from_str(&raw)?;

        if let Ok(value) = std::env::var("MINIBOT_WARN_LIMIT") {
            config.warn_limit = value
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("MINIBOT_WARN_LIMIT={value}")))?;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.owner.trim().is_empty() {
            return Err(ConfigError::Invalid("owner must not be empty".to_string()));
        }
        if self.warn_limit < 1 {
            return Err(ConfigError::Invalid(
                "warnLimit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
