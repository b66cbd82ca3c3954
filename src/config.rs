// MIT License - Copyright (c) 2026 hekit authors

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{KitError, Result};

/// On-disk shape of the config file. Unknown keys are rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    repo_location: String,
}

/// Loaded hekit configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// The config file this was loaded from, tilde-expanded.
    pub config_filename: PathBuf,
    /// Where installed components live, tilde-expanded.
    pub repo_location: PathBuf,
}

/// The user's home directory, from `$HOME`.
pub(crate) fn home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or(KitError::NoHomeDir)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_user(path: &str) -> Result<PathBuf> {
    if path == "~" {
        home_dir()
    } else if let Some(rest) = path.strip_prefix("~/") {
        Ok(home_dir()?.join(rest))
    } else {
        Ok(PathBuf::from(path))
    }
}

/// Default config location, `~/.hekit/default.config`.
pub fn default_config_path() -> Result<PathBuf> {
    Ok(home_dir()?.join(".hekit").join("default.config"))
}

/// Load a config file in TOML format.
pub fn load_config(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path).map_err(|e| KitError::ConfigFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let raw: RawConfig = toml::from_str(&text).map_err(|e| KitError::ConfigFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    if raw.repo_location.is_empty() {
        return Err(KitError::EmptyConfigValue {
            key: "repo_location",
        });
    }

    Ok(Config {
        config_filename: expand_user(&path.to_string_lossy())?,
        repo_location: expand_user(&raw.repo_location)?,
    })
}
