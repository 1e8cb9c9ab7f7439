//! Configuration management for cfddns.
//!
//! Configuration comes from a TOML file when one exists, otherwise from the
//! environment (`API_KEY`, `EMAIL_KEY`, `DOMAIN`, the names the original
//! deployments used). Secret values may be written as `$VAR` to be resolved
//! from the environment at load time.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Cloudflare API key (`X-Auth-Key`).
    pub api_key: String,

    /// Cloudflare account email (`X-Auth-Email`).
    pub auth_email: String,

    /// Domain target specification: `name;zoneID;recordID` triples joined
    /// with `|`.
    pub domains: String,

    /// Seconds between update cycles (default: 3540 = 59 minutes).
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Plain-text IP echo endpoint.
    #[serde(default = "default_ip_endpoint")]
    pub ip_endpoint: String,
}

fn default_interval() -> u64 {
    3540
}

fn default_ip_endpoint() -> String {
    crate::resolver::DEFAULT_IP_ENDPOINT.to_string()
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not find config directory".to_string()))?;

        Ok(config_dir.join("cfddns").join("config.toml"))
    }

    /// Load configuration, preferring an explicit path, then probed default
    /// locations, then the environment.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = cli_path {
            return Self::load_from(path);
        }

        let candidates = [
            Self::default_path().ok(),
            Some(PathBuf::from("/etc/cfddns/config.toml")),
            Some(PathBuf::from("config.toml")),
        ];

        for candidate in candidates.into_iter().flatten() {
            if candidate.exists() {
                return Self::load_from(&candidate);
            }
        }

        Self::from_env()
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.api_key = resolve_env(&config.api_key);
        config.auth_email = resolve_env(&config.auth_email);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            api_key: std::env::var("API_KEY").unwrap_or_default(),
            auth_email: std::env::var("EMAIL_KEY").unwrap_or_default(),
            domains: std::env::var("DOMAIN").unwrap_or_default(),
            interval_secs: std::env::var("INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_interval),
            ip_endpoint: std::env::var("IP_ENDPOINT").unwrap_or_else(|_| default_ip_endpoint()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot possibly produce an update before
    /// any network call is made.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(Error::Config("api_key is not set".to_string()));
        }
        if self.auth_email.is_empty() {
            return Err(Error::Config("auth_email is not set".to_string()));
        }
        if self.domains.is_empty() {
            return Err(Error::Config("no domain targets configured".to_string()));
        }
        Ok(())
    }
}

/// Resolve environment variable references (values starting with $).
fn resolve_env(value: &str) -> String {
    if let Some(var_name) = value.strip_prefix('$') {
        std::env::var(var_name).unwrap_or_else(|_| {
            tracing::warn!("Environment variable {} not set", var_name);
            value.to_string()
        })
    } else {
        value.to_string()
    }
}
