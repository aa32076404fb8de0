//! Where PulseCheck keeps its per-user files.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::AppConfig;

const APP_DIR: &str = "pulsecheck";
const CONFIG_FILE: &str = "config.json";

/// `<platform config dir>/pulsecheck`
pub fn data_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or_else(|| anyhow::anyhow!("no config directory on this platform"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(CONFIG_FILE))
}

/// Config location used when the user data directory is unusable
pub fn temp_config_path() -> PathBuf {
    std::env::temp_dir().join(APP_DIR).join(CONFIG_FILE)
}

/// Write a default config to `path` unless a file is already there.
///
/// Returns whether a file was written.
pub fn write_default_config(path: &Path) -> Result<bool> {
    if path.is_file() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create config directory {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(&AppConfig::default())
        .context("cannot serialize default config")?;
    std::fs::write(path, content)
        .with_context(|| format!("cannot write config file {}", path.display()))?;
    log::info!("Wrote default config to {}", path.display());
    Ok(true)
}
