//! TOML-based application configuration.
//!
//! Stores:
//! - Focus session defaults (initial duration, tick period)
//! - Remote query backend endpoint and credentials
//!
//! Configuration is stored at `~/.config/lockin/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::{ConfigError, CoreError, Result};
use crate::focus::{FocusSettings, DEFAULT_MINUTES};

/// Environment variable overriding `remote.auth_token`.
pub const AUTH_TOKEN_ENV: &str = "LOCKIN_AUTH_TOKEN";

/// Focus session defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusConfig {
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,
    /// Milliseconds between countdown ticks. Each tick removes one second.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Remote query backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub auth_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/lockin/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub focus: FocusConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

fn default_minutes() -> u32 {
    DEFAULT_MINUTES
}
fn default_tick_interval_ms() -> u64 {
    1_000
}
fn default_base_url() -> String {
    "http://martha.jh.shawinigan.info/queries".into()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_minutes(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl FocusConfig {
    pub fn settings(&self) -> FocusSettings {
        FocusSettings {
            default_minutes: if self.default_minutes == 0 {
                DEFAULT_MINUTES
            } else {
                self.default_minutes
            },
            tick_interval: Duration::from_millis(self.tick_interval_ms.max(1)),
        }
    }
}

impl RemoteConfig {
    /// Token from the environment when set, otherwise from the file.
    pub fn resolved_token(&self) -> String {
        std::env::var(AUTH_TOKEN_ENV)
            .ok()
            .filter(|token| !token.is_empty())
            .unwrap_or_else(|| self.auth_token.clone())
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> std::result::Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    let n = value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                    serde_json::Value::Number(n.into())
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    return Err(invalid("cannot set a whole section".into()));
                }
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or create the default file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                CoreError::from(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value has the wrong type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        Ok(())
    }
}
