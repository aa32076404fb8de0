use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Build flavour the application runs as.
///
/// Decides how permission errors are presented: an in-app overlay while
/// developing, the log sink in production.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(anyhow::anyhow!("unknown environment '{}'", other)),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,
    /// Default `tracing` filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Developer overlay settings (ignored in production)
    #[serde(default)]
    pub overlay: OverlayConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            log_level: default_log_level(),
            overlay: OverlayConfig::default(),
        }
    }
}

pub const DEFAULT_LOG_LEVEL: &str = "info";

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OverlayConfig {
    /// Most recent errors kept on screen; older ones are dropped
    #[serde(default = "default_overlay_max_entries")]
    pub max_entries: usize,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_OVERLAY_MAX_ENTRIES,
        }
    }
}

pub const DEFAULT_OVERLAY_MAX_ENTRIES: usize = 20;

fn default_overlay_max_entries() -> usize {
    DEFAULT_OVERLAY_MAX_ENTRIES
}
