//! Configuration and state file locations
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/genesis/`
//! - macOS: `~/Library/Application Support/genesis/`
//! - Windows: `%APPDATA%\genesis\`

use std::io;
use std::path::PathBuf;

/// Application name used for platform directories
const APP_NAME: &str = "genesis";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the path to the state file holding values remembered between runs
pub fn state_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("state.toml"))
}

/// Default location of the access token written by the login flow
pub fn default_token_path() -> PathBuf {
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("token")
}

/// Ensure the configuration directory exists
pub fn ensure_config_dir() -> io::Result<Option<PathBuf>> {
    if let Some(dir) = config_dir() {
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(Some(dir))
    } else {
        Ok(None)
    }
}
