use anyhow::{Context as _, Result};
use pulsecheck_types::{AppConfig, Environment, config_manager};
use std::path::{Path, PathBuf};

/// Overrides `environment` from the config file when set
pub const ENVIRONMENT_VAR: &str = "PULSECHECK_ENV";

/// Resolve the config file: an explicit path, else `<user data dir>/config.json`,
/// created with defaults when missing. Falls back to the temp directory when
/// the user data directory is unavailable or not writable.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    match config_manager::config_path() {
        Ok(path) => ensure_config_or_fallback(path, config_manager::temp_config_path()),
        Err(e) => {
            log::warn!("Failed to resolve user config path: {}", e);
            let fallback = config_manager::temp_config_path();
            config_manager::write_default_config(&fallback)?;
            Ok(fallback)
        }
    }
}

fn ensure_config_or_fallback(primary: PathBuf, fallback: PathBuf) -> Result<PathBuf> {
    match config_manager::write_default_config(&primary) {
        Ok(_) => Ok(primary),
        Err(e) => {
            log::warn!(
                "Cannot use {}: {:#}; falling back to {}",
                primary.display(),
                e,
                fallback.display()
            );
            config_manager::write_default_config(&fallback)?;
            Ok(fallback)
        }
    }
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config = serde_json::from_str(&raw)
        .with_context(|| format!("invalid config at {}", path.display()))?;
    Ok(config)
}

pub fn apply_environment_override(config: &mut AppConfig, value: Option<&str>) -> Result<()> {
    if let Some(value) = value.filter(|value| !value.trim().is_empty()) {
        let environment: Environment = value
            .parse()
            .with_context(|| format!("invalid {} value", ENVIRONMENT_VAR))?;
        config.environment = environment;
    }
    Ok(())
}

/// Load the application config, applying `PULSECHECK_ENV`
pub fn load_config(explicit: Option<PathBuf>) -> Result<AppConfig> {
    let path = resolve_config_path(explicit)?;
    let mut config = load_config_from(&path)?;
    let override_value = std::env::var(ENVIRONMENT_VAR).ok();
    apply_environment_override(&mut config, override_value.as_deref())?;
    log::debug!(
        "Loaded config from {} (environment: {})",
        path.display(),
        config.environment
    );
    Ok(config)
}
