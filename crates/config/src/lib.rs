//! Layered configuration.
//!
//! Later layers override earlier ones:
//!
//! 1. Built-in defaults.
//! 2. `config.toml` in the platform's config directory (e.g.
//!    `~/.config/mts/config.toml` on Linux), if it exists.
//! 3. An explicitly given file (`--config`), in TOML, YAML or JSON.
//! 4. Environment variables prefixed with `MTS_`, using `__` to separate
//!    nested keys (`MTS_PORTAL__RATE_LIMIT=5`).
//!
//! Command line flags are applied on top by the binary.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "MTS_";
const DEFAULT_DATABASE: &str = "mts.sqlite";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database holding harvested data.
    pub database: PathBuf,
    pub portal: PortalConfig,
}
impl Default for Config {
    fn default() -> Self {
        Self { database: PathBuf::from(DEFAULT_DATABASE), portal: PortalConfig::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub base_url: String,
    /// Minimum seconds between two page requests.
    pub rate_limit: f64,
    /// Seconds a single page render may take.
    pub timeout: f64,
    /// Explicit Chrome/Chromium executable; discovered when unset.
    pub chrome: Option<PathBuf>,
}
impl Default for PortalConfig {
    fn default() -> Self {
        Self { base_url: mts_portal::DEFAULT_BASE_URL.to_string(), rate_limit: 2.0, timeout: 30.0, chrome: None }
    }
}
impl PortalConfig {
    pub fn rate_limit(&self) -> Result<Duration> {
        seconds("portal.rate_limit", self.rate_limit)
    }

    pub fn timeout(&self) -> Result<Duration> {
        seconds("portal.timeout", self.timeout)
    }
}

/// Negative, non-finite and out of range values are rejected.
fn seconds(field: &'static str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .or_raise(|| ErrorKind::Validation { field, reason: format!("not a usable number of seconds: {value}") })
}

impl Config {
    /// Load every layer, including the user's config directory and environment.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let user = ProjectDirs::from("de", "tu-berlin", "mts").map(|dirs| dirs.config_dir().join("config.toml"));
        Self::load_layers(user.as_deref(), file)
    }

    /// Load defaults, then an optional user file (skipped if missing), then an
    /// optional explicit file (required to exist), then the environment.
    pub fn load_layers(user: Option<&Path>, file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(user) = user.filter(|p| p.is_file()) {
            tracing::debug!(path = %user.display(), "Loading user configuration");
            figment = figment.merge(Toml::file(user));
        }
        if let Some(file) = file {
            if !file.is_file() {
                exn::bail!(ErrorKind::NotFound(file.to_path_buf()));
            }
            tracing::debug!(path = %file.display(), "Loading configuration file");
            figment = match file.extension().and_then(|e| e.to_str()) {
                Some("toml") => figment.merge(Toml::file(file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
                Some("json") => figment.merge(Json::file(file)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(file.to_path_buf())),
            };
        }
        let config: Config = figment.merge(Env::prefixed(ENV_PREFIX).split("__")).extract().or_raise(|| ErrorKind::Invalid)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<()> {
        if self.database.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Validation { field: "database", reason: "must not be empty".to_string() });
        }
        if !(self.portal.base_url.starts_with("https://") || self.portal.base_url.starts_with("http://")) {
            exn::bail!(ErrorKind::Validation {
                field: "portal.base_url",
                reason: format!("not an http(s) URL: {}", self.portal.base_url),
            });
        }
        self.portal.rate_limit()?;
        if self.portal.timeout()?.is_zero() {
            exn::bail!(ErrorKind::Validation {
                field: "portal.timeout",
                reason: format!("must be a positive number of seconds, got {}", self.portal.timeout),
            });
        }
        Ok(())
    }
}
