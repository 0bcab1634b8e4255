//! Task-file location and optional user configuration
//!
//! The data file is resolved in order: `--file` flag, `BRAID_FILE`
//! environment variable, `data_path` from the user config file, then the
//! platform data directory default.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// User configuration, read from `~/.config/braid/config.toml`
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Where the task file lives
    pub data_path: Option<PathBuf>,
}

/// Loads the user config if one exists
pub fn load_config() -> Result<Config> {
    let Some(path) = config_path() else {
        return Ok(Config::default());
    };
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("braid").join("config.toml"))
}

/// Resolves the path of the task file for this invocation
pub fn resolve_data_path(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path);
    }
    if let Some(path) = std::env::var_os("BRAID_FILE") {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = load_config()?.data_path {
        return Ok(path);
    }

    let data_dir = dirs::data_dir().context("Could not determine a data directory")?;
    Ok(data_dir.join("braid").join("tasks.json"))
}
