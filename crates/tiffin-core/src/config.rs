//! Configuration for Tiffin services.
//!
//! [`TiffinConfig`] is loaded from a TOML file and then overridden by
//! `TIFFIN_*` environment variables. Every field has a default, so a
//! missing file yields a working configuration.
//!
//! File resolution order:
//!
//! 1. Explicit path (`--config`)
//! 2. `TIFFIN_CONFIG` environment variable
//! 3. `<config dir>/tiffin/config.toml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::Money;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "TIFFIN_CONFIG";

const PROJECT_NAME: &str = "tiffin";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiffinConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Persistence settings
    pub storage: StorageConfig,
    /// Vendor assignment tuning
    pub assignment: AssignmentConfig,
    /// Referral rewards
    pub referral: ReferralConfig,
    /// Log output
    pub logging: LoggingConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON snapshot file; in-memory only when unset
    pub data_file: Option<PathBuf>,
}

/// Vendor assignment tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// Default number of requests handled by one auto-assign run
    pub auto_assign_batch: usize,
    /// Rated vendors below this average are not candidates
    pub min_vendor_rating: f64,
    /// Hours of waiting that raise a request one priority level; 0 disables
    pub priority_aging_hours: u32,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            auto_assign_batch: 50,
            min_vendor_rating: 0.0,
            priority_aging_hours: 24,
        }
    }
}

/// Referral rewards, in minor units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferralConfig {
    /// Credited to the referrer
    pub referrer_reward: Money,
    /// Credited to the new user
    pub referee_reward: Money,
}

impl Default for ReferralConfig {
    fn default() -> Self {
        Self {
            referrer_reward: Money::from_minor(10_000),
            referee_reward: Money::from_minor(5_000),
        }
    }
}

/// Log output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TiffinConfig {
    /// Project name used for config directories and messages.
    pub fn project_name() -> &'static str {
        PROJECT_NAME
    }

    /// `<config dir>/tiffin/config.toml`, if the platform has a config dir.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(PROJECT_NAME).join("config.toml"))
    }

    /// Resolves the config file path: explicit, then env var, then default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
            && !path.is_empty()
        {
            return Some(PathBuf::from(path));
        }
        Self::default_config_path()
    }

    /// Loads the resolved file (or defaults) and applies env overrides.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                tracing::debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a config file without applying overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Applies `TIFFIN_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("TIFFIN_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("TIFFIN_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::config(format!("TIFFIN_PORT is not a valid port: {port}")))?;
        }
        if let Some(file) = lookup("TIFFIN_DATA_FILE") {
            self.storage.data_file = if file.is_empty() {
                None
            } else {
                Some(PathBuf::from(file))
            };
        }
        if let Some(level) = lookup("TIFFIN_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Rejects values that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::config("server.host must not be empty"));
        }
        if !(0.0..=5.0).contains(&self.assignment.min_vendor_rating) {
            return Err(Error::config(
                "assignment.min_vendor_rating must be between 0 and 5",
            ));
        }
        if self.assignment.auto_assign_batch == 0 {
            return Err(Error::config("assignment.auto_assign_batch must be at least 1"));
        }
        Ok(())
    }

    /// Serializes to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flattens into `TIFFIN_SECTION_KEY=value` pairs.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value = toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten_env(&value, "TIFFIN", &mut vars);
        Ok(vars)
    }

    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn flatten_env(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, inner) in table {
                let name = format!("{prefix}_{}", key.to_uppercase());
                flatten_env(inner, &name, out);
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}
