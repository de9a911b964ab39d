//! Configuration management with layered hierarchy

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://api.notion.com";
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
pub const DEFAULT_DELAY_SECS: f64 = 1.0;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_KEY: &str = "NOTION_API_KEY";
pub const ENV_DATABASE_ID: &str = "NOTION_DATABASE_ID";
pub const ENV_API_BASE: &str = "NOTION_API_BASE";
pub const ENV_DELAY: &str = "HUNTR_NOTION_DELAY";
pub const ENV_MAX_RETRIES: &str = "HUNTR_NOTION_MAX_RETRIES";

/// Every key accepted in a config file, with a short description
pub const CONFIG_KEYS: [(&str, &str); 7] = [
    ("api_key", "Notion integration secret (env: NOTION_API_KEY)"),
    ("database_id", "Target database ID (env: NOTION_DATABASE_ID)"),
    ("api_base", "API base URL (env: NOTION_API_BASE)"),
    ("notion_version", "Notion-Version header"),
    ("delay_secs", "Base retry delay in seconds (env: HUNTR_NOTION_DELAY)"),
    ("max_retries", "Attempts per record (env: HUNTR_NOTION_MAX_RETRIES)"),
    ("timeout_secs", "HTTP request timeout in seconds"),
];

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    #[diagnostic(code(huntr_notion::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {message}", path.display())]
    #[diagnostic(code(huntr_notion::config::parse))]
    Parse { path: PathBuf, message: String },

    #[error("Missing {key}")]
    #[diagnostic(
        code(huntr_notion::config::missing_secret),
        help("set NOTION_API_KEY and NOTION_DATABASE_ID, or add api_key/database_id to the config file (see `huntr-notion config path`)")
    )]
    MissingSecret {
        key: &'static str,
        env: &'static str,
    },

    #[error("Invalid value for {key}: {value}")]
    #[diagnostic(code(huntr_notion::config::invalid_value))]
    InvalidValue { key: &'static str, value: String },
}

/// huntr-notion configuration with layered hierarchy
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Notion integration secret
    pub api_key: Option<String>,

    /// Database that receives the pages
    pub database_id: Option<String>,

    /// API base URL
    pub api_base: Option<String>,

    /// Value of the Notion-Version header
    pub notion_version: Option<String>,

    /// Base retry delay in seconds
    pub delay_secs: Option<f64>,

    /// Total attempts per record
    pub max_retries: Option<u32>,

    /// HTTP request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// The two secrets needed to talk to the API
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub database_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"***")
            .field("database_id", &self.database_id)
            .finish()
    }
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // 1. Built-in defaults (applied by the accessors)

        // 2. Global user config (~/.config/huntr-notion/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Ok(global) = Self::from_file(&global_path) {
                    config.merge(global);
                }
            }
        }

        // 3. Config file passed on the command line
        if let Some(path) = explicit {
            config.merge(Self::from_file(path)?);
        }

        // 4. Environment variables
        config.apply_env(|key| std::env::var(key).ok())?;

        config.validate()?;
        Ok(config)
    }

    /// Read a single YAML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "huntr-notion")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Overlay values from the environment, looked up through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(id) = get(ENV_DATABASE_ID) {
            self.database_id = Some(id);
        }
        if let Some(base) = get(ENV_API_BASE) {
            self.api_base = Some(base);
        }
        if let Some(raw) = get(ENV_DELAY) {
            let delay = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "delay_secs",
                    value: raw.clone(),
                })?;
            self.delay_secs = Some(delay);
        }
        if let Some(raw) = get(ENV_MAX_RETRIES) {
            let retries = raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "max_retries",
                    value: raw.clone(),
                })?;
            self.max_retries = Some(retries);
        }
        Ok(())
    }

    /// Reject values the accessors cannot turn into durations or counts
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(delay) = self.delay_secs {
            if Duration::try_from_secs_f64(delay).is_err() {
                return Err(ConfigError::InvalidValue {
                    key: "delay_secs",
                    value: delay.to_string(),
                });
            }
        }
        if self.max_retries == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "max_retries",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.database_id.is_some() {
            self.database_id = other.database_id;
        }
        if other.api_base.is_some() {
            self.api_base = other.api_base;
        }
        if other.notion_version.is_some() {
            self.notion_version = other.notion_version;
        }
        if other.delay_secs.is_some() {
            self.delay_secs = other.delay_secs;
        }
        if other.max_retries.is_some() {
            self.max_retries = other.max_retries;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
    }

    /// Both secrets, or the first one that is missing
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let api_key = self
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingSecret {
                key: "api_key",
                env: ENV_API_KEY,
            })?;
        let database_id = self
            .database_id
            .clone()
            .filter(|d| !d.trim().is_empty())
            .ok_or(ConfigError::MissingSecret {
                key: "database_id",
                env: ENV_DATABASE_ID,
            })?;
        Ok(Credentials {
            api_key,
            database_id,
        })
    }

    pub fn api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
    }

    pub fn notion_version(&self) -> &str {
        self.notion_version
            .as_deref()
            .unwrap_or(DEFAULT_NOTION_VERSION)
    }

    /// Base delay between retry attempts
    pub fn delay(&self) -> Duration {
        self.delay_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or_else(|| Duration::from_secs_f64(DEFAULT_DELAY_SECS))
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES).max(1)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Value of a config key for display, with the API key redacted
    pub fn display_value(&self, key: &str) -> Option<String> {
        match key {
            "api_key" => self.api_key.as_ref().map(|k| redact(k)),
            "database_id" => self.database_id.clone(),
            "api_base" => Some(self.api_base().to_string()),
            "notion_version" => Some(self.notion_version().to_string()),
            "delay_secs" => Some(self.delay().as_secs_f64().to_string()),
            "max_retries" => Some(self.max_retries().to_string()),
            "timeout_secs" => Some(self.timeout().as_secs().to_string()),
            _ => None,
        }
    }
}

/// Keep the last four characters of a secret
fn redact(secret: &str) -> String {
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if secret.chars().count() <= 8 {
        "***".to_string()
    } else {
        format!("***{tail}")
    }
}
