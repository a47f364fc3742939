//! TOML-based configuration for the collaboration layer.
//!
//! The config carries only behavior knobs the core itself consumes; transport
//! endpoints and credentials belong to the version-control layer.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::conflict::session::AutoResolvePolicy;
use crate::errors::ConfigError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Collaboration configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollabConfig {
    /// Session behavior settings.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Session behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Batch policy applied when a session is asked to auto-resolve.
    #[serde(default)]
    pub auto_resolve: AutoResolvePolicy,

    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_resolve: AutoResolvePolicy::default(),
            log_level: default_log_level(),
        }
    }
}

impl CollabConfig {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        info!(path = %path.display(), "loading collaboration config");
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(raw).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        debug!(policy = ?config.session.auto_resolve, "config parsed");
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.session.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "session.log_level".into(),
                detail: format!(
                    "'{}' is not one of {}",
                    self.session.log_level,
                    LEVELS.join(", ")
                ),
            });
        }
        Ok(())
    }
}
