// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config file location and state-directory layout (spec §1: "configuration
//! loading and process bootstrap" are the daemon's to own, out of scope for
//! the core per spec §1).

use fv_core::Config;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("could not determine a config directory; set FV_CONFIG_PATH")]
    NoConfigDir,
    #[error("could not determine a state directory; set FV_STATE_DIR")]
    NoStateDir,
}

/// `FV_CONFIG_PATH` > `$XDG_CONFIG_HOME/failoverd/config.toml` > `~/.config/failoverd/config.toml`.
pub fn config_path() -> Result<PathBuf, BootstrapError> {
    if let Ok(path) = std::env::var("FV_CONFIG_PATH") {
        return Ok(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("failoverd").join("config.toml")).ok_or(BootstrapError::NoConfigDir)
}

/// `FV_STATE_DIR` > `$XDG_STATE_HOME/failoverd` > `~/.local/state/failoverd`.
pub fn state_dir() -> Result<PathBuf, BootstrapError> {
    if let Ok(dir) = std::env::var("FV_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::state_dir().map(|d| d.join("failoverd")).ok_or(BootstrapError::NoStateDir)
}

/// Load and parse the control plane config from `path`.
pub fn load_from(path: &Path) -> Result<Config, BootstrapError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|source| BootstrapError::Read { path: path.to_path_buf(), source })?;
    Config::from_toml_str(&raw).map_err(|source| BootstrapError::Parse { path: path.to_path_buf(), source })
}

/// Locate and load the config file (spec §6's recognized-options table).
pub fn load() -> Result<Config, BootstrapError> {
    load_from(&config_path()?)
}
