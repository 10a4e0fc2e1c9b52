//! File-level configuration, persisted as TOML.
//!
//! Lives at `$XDG_CONFIG_HOME/sakura-cycle/config.toml` by default. Every
//! field has a default, so a partial (or absent) file is always valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::EngineConfig;

/// Errors from reading or writing the config file.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(sakura::config::read),
        help("Ensure the config file is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(sakura::config::parse),
        help("Check the TOML syntax. Delete the file to fall back to defaults.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(sakura::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SakuraConfig {
    /// Data directory for the redb file. `None` uses the XDG data dir.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Seconds between decay ticks.
    #[serde(default = "default_decay_interval_secs")]
    pub decay_interval_secs: u64,
    #[serde(default)]
    pub prediction: PredictionConfig,
    #[serde(default)]
    pub cycle: CycleConfig,
}

/// Optional external prediction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Whether to try the HTTP service before the rule-based fallback.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// The user's cycle setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleConfig {
    #[serde(default = "default_cycle_length")]
    pub cycle_length: u32,
    #[serde(default = "default_period_duration")]
    pub period_duration: u32,
    #[serde(default)]
    pub menopausal: bool,
    #[serde(default)]
    pub last_period_start: Option<NaiveDate>,
    #[serde(default)]
    pub age: Option<u32>,
}

fn default_decay_interval_secs() -> u64 {
    30 * 60
}
fn default_base_url() -> String {
    "http://localhost:5000".into()
}
fn default_timeout_secs() -> u64 {
    5
}
fn default_cycle_length() -> u32 {
    28
}
fn default_period_duration() -> u32 {
    5
}

impl Default for SakuraConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            decay_interval_secs: default_decay_interval_secs(),
            prediction: PredictionConfig::default(),
            cycle: CycleConfig::default(),
        }
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            cycle_length: default_cycle_length(),
            period_duration: default_period_duration(),
            menopausal: false,
            last_period_start: None,
            age: None,
        }
    }
}

impl SakuraConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load from a TOML file, or return defaults if it doesn't exist.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Engine settings derived from this config. `fallback_data_dir` is used
    /// when the file doesn't name one.
    pub fn to_engine_config(&self, fallback_data_dir: Option<PathBuf>) -> EngineConfig {
        EngineConfig {
            data_dir: self.data_dir.clone().or(fallback_data_dir),
            decay_interval: Duration::from_secs(self.decay_interval_secs),
            ..Default::default()
        }
    }
}
