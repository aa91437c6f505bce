//! Configuration file handling
//!
//! Settings come from `config.toml` in the config directory, then from
//! environment variables. The resulting [`Config`] is built once in `main`
//! and handed to whatever needs it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::{self, config_path, state_path};
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Host serving the test execution API
    #[serde(default = "default_wb_host")]
    pub wb_host: String,

    /// Upload endpoint path, `{org}` is replaced with the organization
    #[serde(default = "default_upload_uri")]
    pub upload_uri: String,

    /// Zone appended to generated domain names
    #[serde(default = "default_dns_zone")]
    pub dns_zone: String,

    /// File holding the bearer token used for API calls
    #[serde(default = "paths::default_token_path")]
    pub token_path: PathBuf,

    /// Organization used when none is given or remembered
    #[serde(default)]
    pub org_id: String,

    /// Log level for this crate when `RUST_LOG` is unset
    #[serde(default = "default_verbosity")]
    pub verbosity: String,

    /// Delay between status polls of a run
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wb_host: default_wb_host(),
            upload_uri: default_upload_uri(),
            dns_zone: default_dns_zone(),
            token_path: paths::default_token_path(),
            org_id: String::new(),
            verbosity: default_verbosity(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

fn default_wb_host() -> String {
    "www.infra.whiteblock.io".to_string()
}
fn default_upload_uri() -> String {
    "/api/v1/testexecution/organizations/{org}/files".to_string()
}
fn default_dns_zone() -> String {
    "biomes.whiteblock.io".to_string()
}
fn default_verbosity() -> String {
    "info".to_string()
}
fn default_poll_interval() -> u64 {
    1000
}

impl Config {
    /// Load configuration from the default config file and the environment
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Override settings from environment variables
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut String, key: &str| {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *target = value;
            }
        };
        set(&mut self.wb_host, "WB_HOST");
        set(&mut self.upload_uri, "MULTIPART_UPLOAD_URI");
        set(&mut self.dns_zone, "DNS_ZONE");
        set(&mut self.org_id, "ORG_ID");
        set(&mut self.verbosity, "VERBOSITY");

        if let Some(path) = lookup("TOKEN_PATH").filter(|v| !v.is_empty()) {
            self.token_path = PathBuf::from(path);
        }
        if let Some(ms) = lookup("POLL_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.poll_interval_ms = ms;
        }
    }

    /// Status poll interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Base URL of the API, with a scheme added when the host has none
    pub fn base_url(&self) -> String {
        let host = self.wb_host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        }
    }

    /// Full upload URL for an organization
    pub fn upload_url(&self, org: &str) -> String {
        format!("{}{}", self.base_url(), self.upload_uri.replace("{org}", org))
    }

    /// Read the bearer token, if one has been stored
    pub fn token(&self) -> Option<String> {
        std::fs::read_to_string(&self.token_path)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Values remembered between invocations
#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct State {
    /// Last organization passed on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
}

impl State {
    /// Load the state file, treating a missing or unreadable file as empty
    pub fn load() -> Self {
        state_path()
            .and_then(|path| Self::from_file(&path).ok())
            .unwrap_or_default()
    }

    /// Parse a state file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Write the state file to the config directory
    pub fn save(&self) -> Result<()> {
        paths::ensure_config_dir()?;
        match state_path() {
            Some(path) => self.save_to(&path),
            None => Err(Error::Config("no config directory available".to_string())),
        }
    }

    /// Write the state to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string(self).map_err(|e| Error::Internal(format!("state encoding: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Pick the organization for this run
///
/// An explicit value wins, then the remembered one, then the configured
/// default. Returns the org and whether it should be remembered.
pub fn resolve_org(explicit: Option<&str>, state: &State, config: &Config) -> Result<(String, bool)> {
    if let Some(org) = explicit.map(str::trim).filter(|o| !o.is_empty()) {
        let changed = state.org.as_deref() != Some(org);
        return Ok((org.to_string(), changed));
    }
    if let Some(org) = state.org.as_deref().filter(|o| !o.is_empty()) {
        return Ok((org.to_string(), false));
    }
    if !config.org_id.is_empty() {
        return Ok((config.org_id.clone(), false));
    }
    Err(Error::NoOrg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str("dns_zone = \"example.net\"").unwrap();
        assert_eq!(config.dns_zone, "example.net");
        assert_eq!(config.wb_host, "www.infra.whiteblock.io");
        assert_eq!(config.poll_interval_ms, 1000);
    }

    #[test]
    fn test_env_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("WB_HOST", "http://localhost:8080"),
            ("ORG_ID", "acme"),
            ("POLL_INTERVAL_MS", "250"),
            ("DNS_ZONE", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.base_url(), "http://localhost:8080");
        assert_eq!(config.org_id, "acme");
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.dns_zone, "biomes.whiteblock.io");
    }

    #[test]
    fn test_upload_url_substitutes_org() {
        let config = Config::default();
        assert_eq!(
            config.upload_url("acme"),
            "https://www.infra.whiteblock.io/api/v1/testexecution/organizations/acme/files"
        );
    }

    #[test]
    fn test_resolve_org_precedence() {
        let mut config = Config::default();
        let empty = State::default();
        assert!(matches!(resolve_org(None, &empty, &config), Err(Error::NoOrg)));

        config.org_id = "configured".to_string();
        assert_eq!(
            resolve_org(None, &empty, &config).unwrap(),
            ("configured".to_string(), false)
        );

        let remembered = State {
            org: Some("remembered".to_string()),
        };
        assert_eq!(
            resolve_org(None, &remembered, &config).unwrap(),
            ("remembered".to_string(), false)
        );
        assert_eq!(
            resolve_org(Some("explicit"), &remembered, &config).unwrap(),
            ("explicit".to_string(), true)
        );
        assert_eq!(
            resolve_org(Some("remembered"), &remembered, &config).unwrap(),
            ("remembered".to_string(), false)
        );
    }

    #[test]
    fn test_state_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");
        let state = State {
            org: Some("acme".to_string()),
        };
        state.save_to(&path).unwrap();
        assert_eq!(State::from_file(&path).unwrap(), state);
    }

    #[test]
    fn test_token_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "abc123\n").unwrap();

        let config = Config {
            token_path: path,
            ..Config::default()
        };
        assert_eq!(config.token().as_deref(), Some("abc123"));
    }
}
